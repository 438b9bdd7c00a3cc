//! The persisted settings record and its fixed byte layout.
//!
//! # Byte layout
//!
//! All multi-byte fields are little-endian:
//!
//! ```text
//! offset  size  field
//!      0     4  version (u32)
//!      4    32  decay, diffusion, input cut, tank cut,
//!               mod speed, mod depth, mod shape, pre-delay (f32 each)
//!     36     1  mono-stereo index
//!     37     1  makeup-gain index
//!     38     3  bypass reverb, bypass delay, bypass tremolo (0 or 1)
//! ```

use flick_effects::{BypassState, MakeupGain, MonoStereoMode, ReverbParams};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Current record schema. Any stored record with a different version is
/// discarded whole.
pub const SCHEMA_VERSION: u32 = 5;

/// Size of an encoded record in bytes.
pub const RECORD_LEN: usize = 4 + 8 * 4 + 5;

/// User state that survives a power cycle.
///
/// Enumerated fields are stored as their indices so that an unknown value
/// read from storage can fall back to a default instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    /// Schema version the record was written with.
    pub version: u32,
    /// Plate tank decay.
    pub decay: f32,
    /// Plate tank diffusion.
    pub diffusion: f32,
    /// Plate input high cut (pitch units).
    pub input_cutoff: f32,
    /// Plate tank high cut (pitch units).
    pub tank_cutoff: f32,
    /// Plate modulation speed.
    pub tank_mod_speed: f32,
    /// Plate modulation depth.
    pub tank_mod_depth: f32,
    /// Plate modulation shape.
    pub tank_mod_shape: f32,
    /// Plate pre-delay in seconds.
    pub pre_delay: f32,
    /// [`MonoStereoMode`] index.
    pub mono_stereo_mode: u8,
    /// [`MakeupGain`] index.
    pub makeup_gain: u8,
    /// Reverb bypassed.
    pub bypass_reverb: bool,
    /// Delay bypassed.
    pub bypass_delay: bool,
    /// Tremolo bypassed.
    pub bypass_tremolo: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        let mut settings = Self {
            version: SCHEMA_VERSION,
            decay: 0.0,
            diffusion: 0.0,
            input_cutoff: 0.0,
            tank_cutoff: 0.0,
            tank_mod_speed: 0.0,
            tank_mod_depth: 0.0,
            tank_mod_shape: 0.0,
            pre_delay: 0.0,
            mono_stereo_mode: MonoStereoMode::default().index(),
            makeup_gain: MakeupGain::default().index(),
            bypass_reverb: true,
            bypass_delay: true,
            bypass_tremolo: true,
        };
        settings.set_reverb_params(&ReverbParams::default());
        settings
    }
}

impl PersistedSettings {
    /// The plate parameters held in this record.
    pub fn reverb_params(&self) -> ReverbParams {
        ReverbParams {
            decay: self.decay,
            diffusion: self.diffusion,
            input_high_cut: self.input_cutoff,
            tank_high_cut: self.tank_cutoff,
            mod_speed: self.tank_mod_speed,
            mod_depth: self.tank_mod_depth,
            mod_shape: self.tank_mod_shape,
            pre_delay: self.pre_delay,
        }
    }

    /// Overwrites the plate parameters.
    pub fn set_reverb_params(&mut self, params: &ReverbParams) {
        self.decay = params.decay;
        self.diffusion = params.diffusion;
        self.input_cutoff = params.input_high_cut;
        self.tank_cutoff = params.tank_high_cut;
        self.tank_mod_speed = params.mod_speed;
        self.tank_mod_depth = params.mod_depth;
        self.tank_mod_shape = params.mod_shape;
        self.pre_delay = params.pre_delay;
    }

    /// Decoded routing mode, defaulting when the index is unknown.
    pub fn mono_stereo(&self) -> MonoStereoMode {
        MonoStereoMode::from_index(self.mono_stereo_mode).unwrap_or_default()
    }

    /// Decoded makeup-gain tier, defaulting when the index is unknown.
    pub fn makeup(&self) -> MakeupGain {
        MakeupGain::from_index(self.makeup_gain).unwrap_or_default()
    }

    /// Bypass flags.
    pub fn bypass(&self) -> BypassState {
        BypassState {
            reverb: self.bypass_reverb,
            delay: self.bypass_delay,
            tremolo: self.bypass_tremolo,
        }
    }

    /// Overwrites the bypass flags.
    pub fn set_bypass(&mut self, bypass: BypassState) {
        self.bypass_reverb = bypass.reverb;
        self.bypass_delay = bypass.delay;
        self.bypass_tremolo = bypass.tremolo;
    }

    /// Replaces unknown enum indices with defaults and clamps the floats
    /// into their documented ranges. The version is left untouched.
    pub fn sanitized(&self) -> Self {
        let mut clean = *self;
        clean.set_reverb_params(&self.reverb_params().sanitized());
        clean.mono_stereo_mode = self.mono_stereo().index();
        clean.makeup_gain = self.makeup().index();
        clean
    }

    /// Encodes the record into its fixed byte layout.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        let floats = [
            self.decay,
            self.diffusion,
            self.input_cutoff,
            self.tank_cutoff,
            self.tank_mod_speed,
            self.tank_mod_depth,
            self.tank_mod_shape,
            self.pre_delay,
        ];
        for (chunk, value) in out[4..36].chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out[36] = self.mono_stereo_mode;
        out[37] = self.makeup_gain;
        out[38] = u8::from(self.bypass_reverb);
        out[39] = u8::from(self.bypass_delay);
        out[40] = u8::from(self.bypass_tremolo);
        out
    }

    /// Decodes a record. Extra trailing bytes are ignored.
    ///
    /// No version check or sanitizing happens here; the store decides what
    /// to do with a foreign version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let Some(bytes) = bytes.get(..RECORD_LEN) else {
            return Err(ConfigError::RecordTooShort {
                len: bytes.len(),
                expected: RECORD_LEN,
            });
        };
        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let float = |index: usize| f32::from_le_bytes(word(4 + index * 4));
        Ok(Self {
            version: u32::from_le_bytes(word(0)),
            decay: float(0),
            diffusion: float(1),
            input_cutoff: float(2),
            tank_cutoff: float(3),
            tank_mod_speed: float(4),
            tank_mod_depth: float(5),
            tank_mod_shape: float(6),
            pre_delay: float(7),
            mono_stereo_mode: bytes[36],
            makeup_gain: bytes[37],
            bypass_reverb: bytes[38] != 0,
            bypass_delay: bytes[39] != 0,
            bypass_tremolo: bytes[40] != 0,
        })
    }
}
