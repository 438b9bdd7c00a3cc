//! Live block-rate parameters shared by the control surface and the pipeline.
//!
//! [`EffectParameters`] is written once per audio block by the mode
//! controller and read by every sample of the [`Pipeline`](crate::Pipeline)
//! during that block. The enums here carry the fixed gain tables that go with
//! each setting.

use flick_core::NoteDivision;

use crate::reverb::{ReverbParams, ReverbType};

/// Shortest delay time in seconds.
pub const MIN_DELAY_SECONDS: f32 = 0.05;
/// Longest delay time in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;
/// Slowest tremolo rate in Hz.
pub const MIN_TREMOLO_HZ: f32 = 0.2;
/// Fastest tremolo rate in Hz.
pub const MAX_TREMOLO_HZ: f32 = 16.0;

/// Channel routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonoStereoMode {
    /// Mono in, mono out: left input only, outputs summed into the left jack.
    #[default]
    Mimo,
    /// Mono in, stereo out: left input copied to both channels.
    Miso,
    /// Stereo in, stereo out.
    Siso,
}

impl MonoStereoMode {
    /// Decodes a persisted index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Mimo),
            1 => Some(Self::Miso),
            2 => Some(Self::Siso),
            _ => None,
        }
    }

    /// Index used in the persisted record.
    pub fn index(self) -> u8 {
        match self {
            Self::Mimo => 0,
            Self::Miso => 1,
            Self::Siso => 2,
        }
    }

    /// True when the right input is ignored and the left is duplicated.
    pub fn is_mono_input(self) -> bool {
        matches!(self, Self::Mimo | Self::Miso)
    }

    /// Scale applied to the limited reverb input, and the inverse scale that
    /// brings the dry leg back to unity.
    ///
    /// Summing to one output jack in MIMO halves each channel, so the send
    /// is pushed twice as hard to keep the reverb level matched.
    pub fn reverb_scales(self) -> (f32, f32) {
        match self {
            Self::Mimo => (5.0, 0.2),
            Self::Miso | Self::Siso => (2.5, 0.4),
        }
    }
}

/// Makeup gain tier compensating the level lost to delay and tremolo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MakeupGain {
    /// Unity.
    None,
    /// Moderate boost.
    #[default]
    Normal,
    /// Strong boost.
    Heavy,
}

impl MakeupGain {
    /// Decodes a persisted index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::None),
            1 => Some(Self::Normal),
            2 => Some(Self::Heavy),
            _ => None,
        }
    }

    /// Index used in the persisted record.
    pub fn index(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Normal => 1,
            Self::Heavy => 2,
        }
    }

    /// Multiplier for the delay's dry leg.
    pub fn delay_gain(self) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Normal => 1.66,
            Self::Heavy => 2.0,
        }
    }

    /// Multiplier for the tremolo output.
    pub fn tremolo_gain(self) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Normal => 1.2,
            Self::Heavy => 1.6,
        }
    }
}

/// Tremolo algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TremoloMode {
    /// Sine amplitude modulation.
    #[default]
    Sine,
    /// Rounded-square amplitude modulation.
    Square,
    /// Opposite-phase modulation of a low and a high band.
    Harmonic,
}

impl TremoloMode {
    /// Peak modulation depth for this mode.
    pub fn max_depth(self) -> f32 {
        match self {
            Self::Sine | Self::Square => 0.5,
            Self::Harmonic => 0.625,
        }
    }

    /// Maps a depth knob reading onto this mode's depth range.
    ///
    /// ```rust
    /// use flick_effects::TremoloMode;
    ///
    /// assert_eq!(TremoloMode::Sine.scaled_depth(1.0), 0.5);
    /// assert_eq!(TremoloMode::Harmonic.scaled_depth(1.0), 0.625);
    /// assert_eq!(TremoloMode::Square.scaled_depth(-3.0), 0.0);
    /// ```
    pub fn scaled_depth(self, knob: f32) -> f32 {
        let knob = if knob.is_nan() { 0.0 } else { knob.clamp(0.0, 1.0) };
        knob * self.max_depth()
    }
}

/// How the dry signal is weighted against the reverb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReverbMix {
    /// Dry at unity, reverb added on top.
    AllDry,
    /// Dry fades out as the wet amount rises.
    #[default]
    Crossfade,
    /// Reverb only.
    AllWet,
}

impl ReverbMix {
    /// Dry level for a given wet amount.
    pub fn dry_level(self, wet: f32) -> f32 {
        match self {
            Self::AllDry => 1.0,
            Self::Crossfade => 1.0 - wet.clamp(0.0, 1.0),
            Self::AllWet => 0.0,
        }
    }
}

/// Bypass flags for the three effects. `true` means bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BypassState {
    /// Reverb bypassed.
    pub reverb: bool,
    /// Delay bypassed.
    pub delay: bool,
    /// Tremolo bypassed.
    pub tremolo: bool,
}

impl BypassState {
    /// Everything bypassed.
    pub const ALL: Self = Self {
        reverb: true,
        delay: true,
        tremolo: true,
    };
}

impl Default for BypassState {
    fn default() -> Self {
        Self::ALL
    }
}

/// Snapshot of every parameter the pipeline reads during one block.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParameters {
    /// Reverb wet amount, 0..1.
    pub reverb_wet: f32,
    /// Dry/wet policy.
    pub reverb_mix: ReverbMix,
    /// Active reverb engine.
    pub reverb_type: ReverbType,
    /// Parameters for the configurable reverb engine.
    pub reverb: ReverbParams,
    /// Tremolo rate in Hz.
    pub tremolo_speed_hz: f32,
    /// Tremolo depth knob, 0..1, before per-mode scaling.
    pub tremolo_depth: f32,
    /// Tremolo algorithm.
    pub tremolo_mode: TremoloMode,
    /// Delay time of one beat, in samples.
    pub delay_time_samples: f32,
    /// Delay feedback, 0..1.
    pub delay_feedback: f32,
    /// Delay amount in percent, 0..100.
    pub delay_mix_percent: f32,
    /// Fraction of the beat used as the echo spacing.
    pub delay_subdivision: NoteDivision,
    /// Makeup gain tier.
    pub makeup_gain: MakeupGain,
    /// Channel routing.
    pub mono_stereo: MonoStereoMode,
    /// Bypass flags.
    pub bypass: BypassState,
}

impl EffectParameters {
    /// Neutral parameters for `sample_rate`: everything bypassed, the delay
    /// at its shortest time.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            reverb_wet: 0.5,
            reverb_mix: ReverbMix::default(),
            reverb_type: ReverbType::default(),
            reverb: ReverbParams::default(),
            tremolo_speed_hz: 4.0,
            tremolo_depth: 0.5,
            tremolo_mode: TremoloMode::default(),
            delay_time_samples: MIN_DELAY_SECONDS * sample_rate,
            delay_feedback: 0.3,
            delay_mix_percent: 50.0,
            delay_subdivision: NoteDivision::Quarter,
            makeup_gain: MakeupGain::default(),
            mono_stereo: MonoStereoMode::default(),
            bypass: BypassState::ALL,
        }
    }
}
