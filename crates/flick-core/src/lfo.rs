//! Phase-accumulator low frequency oscillator.
//!
//! Drives the tremolo depth and the reverb tank modulation.
//! [`LfoWaveform::RoundedSquare`] gives the soft-edged square used by the
//! square tremolo, so that fast rates do not click.

use core::f32::consts::PI;
use libm::{sinf, tanhf};

/// Edge steepness of the rounded square.
const ROUNDED_SQUARE_DRIVE: f32 = 4.0;

/// LFO waveform type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Linear ramps up and down.
    Triangle,
    /// Saturated sine: flat tops, smooth transitions.
    RoundedSquare,
}

/// Low frequency oscillator producing values in `[-amplitude, amplitude]`.
///
/// ```rust
/// use flick_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(48000.0, 4.0);
/// lfo.set_waveform(LfoWaveform::RoundedSquare);
/// lfo.set_amplitude(0.5);
/// let v = lfo.next();
/// assert!(v.abs() <= 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase in [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    amplitude: f32,
    waveform: LfoWaveform,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Creates a unit-amplitude sine at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz.max(0.0) / sample_rate,
            sample_rate,
            amplitude: 1.0,
            waveform: LfoWaveform::Sine,
        }
    }

    /// Sets the rate in Hz. Negative rates are treated as zero.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz.max(0.0) / self.sample_rate;
    }

    /// Current rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Sets the peak output level.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Peak output level.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Selects the waveform. Phase is preserved.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Resets phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Sets the phase (0.0 - 1.0). 0.25 is a quarter cycle.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(1.0);
    }

    /// Current phase (0.0 - 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Unscaled waveform value at the current phase, in [-1.0, 1.0].
    #[inline]
    fn shape(&self) -> f32 {
        let t = self.phase;
        match self.waveform {
            LfoWaveform::Sine => sinf(t * 2.0 * PI),
            LfoWaveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            LfoWaveform::RoundedSquare => {
                tanhf(ROUNDED_SQUARE_DRIVE * sinf(t * 2.0 * PI)) / tanhf(ROUNDED_SQUARE_DRIVE)
            }
        }
    }

    /// Returns the next sample and advances the phase.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = self.shape().clamp(-1.0, 1.0) * self.amplitude;
        self.advance();
        output
    }

    /// Advances the phase by one sample without computing a value.
    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LfoWaveform; 3] = [LfoWaveform::Sine, LfoWaveform::Triangle, LfoWaveform::RoundedSquare];

    #[test]
    fn test_lfo_phase_accumulation() {
        let mut lfo = Lfo::new(48000.0, 1.0);
        for _ in 0..48000 {
            lfo.next();
        }
        let phase_error = lfo.phase().min((lfo.phase() - 1.0).abs());
        assert!(phase_error < 0.01);
    }

    #[test]
    fn test_lfo_output_range_follows_amplitude() {
        let mut lfo = Lfo::new(48000.0, 16.0);
        lfo.set_amplitude(0.625);
        for waveform in ALL {
            lfo.set_waveform(waveform);
            lfo.reset();
            for _ in 0..6000 {
                let value = lfo.next();
                assert!(value.abs() <= 0.625 + 1e-6, "{waveform:?} out of range: {value}");
            }
        }
    }

    #[test]
    fn test_rounded_square_is_flat_topped() {
        let mut lfo = Lfo::new(48000.0, 1.0);
        lfo.set_waveform(LfoWaveform::RoundedSquare);
        lfo.set_phase(0.25);
        assert!((lfo.next() - 1.0).abs() < 1e-4);
        // An eighth of a cycle in, a sine is at 0.707; the rounded square is near its top.
        lfo.set_phase(0.125);
        assert!(lfo.next() > 0.95);
    }

    #[test]
    fn test_lfo_phase_offset() {
        let mut a = Lfo::new(48000.0, 2.0);
        let mut b = Lfo::new(48000.0, 2.0);
        b.set_phase(0.5);
        assert!((a.next() + b.next()).abs() < 0.01);
    }

    #[test]
    fn test_advance_matches_next() {
        let mut a = Lfo::new(48000.0, 3.0);
        let mut b = Lfo::new(48000.0, 3.0);
        for _ in 0..100 {
            a.next();
            b.advance();
        }
        assert_eq!(a.phase(), b.phase());
    }
}
