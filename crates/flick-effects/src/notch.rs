//! Fixed notches removing the hardware's intrinsic resonances.
//!
//! Always in the signal path, independent of bypass state.

use flick_core::{Biquad, biquad};

/// Center frequencies of the two notches, in Hz.
pub const NOTCH_FREQUENCIES: [f32; 2] = [6020.0, 12278.0];
/// Notch cut depth.
pub const NOTCH_GAIN_DB: f32 = -30.0;
/// Notch bandwidth.
pub const NOTCH_Q: f32 = 40.0;

/// Two cascaded peaking cuts per channel, identical on left and right.
#[derive(Debug, Clone)]
pub struct NotchStage {
    left: [Biquad; 2],
    right: [Biquad; 2],
}

impl NotchStage {
    /// Designs both notches for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let sections = NOTCH_FREQUENCIES
            .map(|freq| Biquad::with_coefficients(biquad::peaking(freq, NOTCH_Q, NOTCH_GAIN_DB, sample_rate)));
        Self {
            left: sections.clone(),
            right: sections,
        }
    }

    /// Filters one stereo frame.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let l = self.left.iter_mut().fold(left, |x, section| section.process(x));
        let r = self.right.iter_mut().fold(right, |x, section| section.process(x));
        (l, r)
    }

    /// Clears filter memory.
    pub fn clear(&mut self) {
        self.left.iter_mut().chain(self.right.iter_mut()).for_each(Biquad::clear);
    }
}
