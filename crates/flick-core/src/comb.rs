//! Feedback comb with a damping low-pass in the loop.
//!
//! Building block of the hall reverb (a Freeverb-style bank of parallel
//! combs followed by allpass diffusers).

use crate::InterpolatedDelay;
use crate::math::flush_denormal;

/// Damped feedback comb filter.
///
/// ```rust
/// use flick_core::CombFilter;
///
/// let mut comb = CombFilter::new(1116);
/// comb.set_feedback(0.95);
/// comb.set_damp(0.2);
/// assert_eq!(comb.process(1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: InterpolatedDelay,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    /// Creates a comb with a loop of `delay_samples` samples.
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    /// Loop gain, clamped to [0, 0.99].
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Current loop gain.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Damping in [0, 1]: 0 keeps the loop bright, 1 darkens it fully.
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    /// Processes one sample; the output is the loop's delayed signal.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.delay.read((self.delay.capacity() - 1) as f32);
        self.filter_state = flush_denormal(output * (1.0 - self.damp) + self.filter_state * self.damp);
        self.delay.write(input + self.filter_state * self.feedback);
        output
    }

    /// Zeroes the loop.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.filter_state = 0.0;
    }

    /// Loop length in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }
}
