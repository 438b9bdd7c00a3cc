//! Interchangeable reverb engines behind one contract.
//!
//! The pipeline talks to whichever engine the DIP switches select through
//! [`ReverbEngine`]. Only the plate models every [`ReverbParams`] field; the
//! hall and spring keep their own fixed voicing and ignore the rest.

mod hall;
mod plate;
mod selector;
mod spring;

pub use hall::HallReverb;
pub use plate::PlateReverb;
pub use selector::ReverbSelector;
pub use spring::SpringReverb;

/// Reverb engine contract.
pub trait ReverbEngine {
    /// Applies the block's reverb parameters. Engines may ignore fields they
    /// do not model.
    fn configure(&mut self, params: &ReverbParams);

    /// Processes one stereo frame. Called every sample, bypassed or not.
    fn process(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Flushes all internal delay and feedback state so the next
    /// activation starts silent.
    fn clear(&mut self);
}

/// Which engine is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReverbType {
    /// Dattorro-style plate (fully configurable).
    #[default]
    Plate,
    /// Dispersive spring tank.
    Spring,
    /// Freeverb-style hall.
    Hall,
}

impl ReverbType {
    /// Decodes the two-position DIP switch pair: 00 plate, 01 spring,
    /// 10 hall, 11 plate.
    pub fn from_dip(dip1: bool, dip2: bool) -> Self {
        match (dip1, dip2) {
            (false, true) => Self::Spring,
            (true, false) => Self::Hall,
            (false, false) | (true, true) => Self::Plate,
        }
    }
}

/// Tunable plate parameters.
///
/// The high-cut values are in pitch units (`440 * 2^(p - 5)` Hz, 0..10);
/// the modulation fields are the raw table values before engine scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Tank feedback, 0..1.
    pub decay: f32,
    /// Tank allpass diffusion, 0..1.
    pub diffusion: f32,
    /// Input low-pass cutoff (pitch units).
    pub input_high_cut: f32,
    /// Tank damping low-pass cutoff (pitch units).
    pub tank_high_cut: f32,
    /// Tank modulation speed, 0..1.
    pub mod_speed: f32,
    /// Tank modulation depth, 0..1.
    pub mod_depth: f32,
    /// Tank modulation shape, 0 triangle to 1 sine.
    pub mod_shape: f32,
    /// Pre-delay in seconds, 0..0.25.
    pub pre_delay: f32,
}

impl ReverbParams {
    /// Clamps every field into its documented range, replacing NaN with the default.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let fix = |v: f32, fallback: f32, lo: f32, hi: f32| if v.is_nan() { fallback } else { v.clamp(lo, hi) };
        Self {
            decay: fix(self.decay, d.decay, 0.0, 1.0),
            diffusion: fix(self.diffusion, d.diffusion, 0.0, 1.0),
            input_high_cut: fix(self.input_high_cut, d.input_high_cut, 0.0, 10.0),
            tank_high_cut: fix(self.tank_high_cut, d.tank_high_cut, 0.0, 10.0),
            mod_speed: fix(self.mod_speed, d.mod_speed, 0.0, 1.0),
            mod_depth: fix(self.mod_depth, d.mod_depth, 0.0, 1.0),
            mod_shape: fix(self.mod_shape, d.mod_shape, 0.0, 1.0),
            pre_delay: fix(self.pre_delay, d.pre_delay, 0.0, 0.25),
        }
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            decay: 0.8,
            diffusion: 0.85,
            input_high_cut: 7.25,
            tank_high_cut: 7.25,
            mod_speed: 0.1,
            mod_depth: 0.1,
            mod_shape: 0.25,
            pre_delay: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dip_decoding() {
        assert_eq!(ReverbType::from_dip(false, false), ReverbType::Plate);
        assert_eq!(ReverbType::from_dip(false, true), ReverbType::Spring);
        assert_eq!(ReverbType::from_dip(true, false), ReverbType::Hall);
        assert_eq!(ReverbType::from_dip(true, true), ReverbType::Plate);
    }

    #[test]
    fn sanitized_clamps_and_replaces_nan() {
        let wild = ReverbParams {
            decay: 4.0,
            diffusion: f32::NAN,
            input_high_cut: -1.0,
            pre_delay: 3.0,
            ..ReverbParams::default()
        };
        let clean = wild.sanitized();
        assert_eq!(clean.decay, 1.0);
        assert_eq!(clean.diffusion, 0.85);
        assert_eq!(clean.input_high_cut, 0.0);
        assert_eq!(clean.pre_delay, 0.25);
    }
}
