//! One-pole (6 dB/oct) low-pass and high-pass filters.
//!
//! ```text
//! lp[n] = x[n] + coeff * (lp[n-1] - x[n])
//! hp[n] = x[n] - lp[n]
//! ```
//!
//! with `coeff = exp(-2π * freq / sample_rate)`. The harmonic tremolo splits
//! its input into bands with these, and the reverbs use the low-pass as a
//! damping element inside their feedback loops.
//!
//! ```rust
//! use flick_core::{OnePole, OnePoleHighpass};
//!
//! let mut lp = OnePole::new(48000.0, 144.0);
//! let mut hp = OnePoleHighpass::new(48000.0, 636.0);
//! let low = lp.process(1.0);
//! let high = hp.process(1.0);
//! assert!(low < 1.0 && high > 0.0);
//! ```

use crate::math::flush_denormal;
use libm::expf;

#[inline]
fn pole_coefficient(freq_hz: f32, sample_rate: f32) -> f32 {
    let freq = freq_hz.clamp(0.0, sample_rate * 0.5);
    expf(-core::f32::consts::TAU * freq / sample_rate)
}

/// One-pole low-pass filter.
///
/// `coeff` stays in (0, 1] so the filter is stable for every setting.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Creates a low-pass with cutoff `freq_hz` (the -3 dB point).
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            state: 0.0,
            coeff: pole_coefficient(freq_hz, sample_rate),
            sample_rate,
            freq: freq_hz,
        }
    }

    /// Moves the cutoff.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.coeff = pole_coefficient(freq_hz, self.sample_rate);
    }

    /// Cutoff in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Clears the filter memory.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// One-pole high-pass filter, the complement of [`OnePole`].
#[derive(Debug, Clone)]
pub struct OnePoleHighpass {
    lowpass: OnePole,
}

impl OnePoleHighpass {
    /// Creates a high-pass with cutoff `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            lowpass: OnePole::new(sample_rate, freq_hz),
        }
    }

    /// Moves the cutoff.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.lowpass.set_frequency(freq_hz);
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        flush_denormal(input - self.lowpass.process(input))
    }

    /// Clears the filter memory.
    pub fn reset(&mut self) {
        self.lowpass.reset();
    }
}
