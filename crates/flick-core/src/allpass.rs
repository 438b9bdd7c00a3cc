//! Allpass diffusers for the reverb networks.
//!
//! Both filters use the lattice form
//!
//! ```text
//! w[n] = x[n] + g * w[n-D]
//! y[n] = w[n-D] - g * w[n]
//! ```
//!
//! which has unit magnitude response for every `|g| < 1`.

use crate::InterpolatedDelay;
use crate::math::flush_denormal;

/// Fixed-length allpass.
///
/// ```rust
/// use flick_core::AllpassFilter;
///
/// let mut ap = AllpassFilter::new(229);
/// ap.set_feedback(0.6);
/// assert!((ap.process(1.0) + 0.6).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct AllpassFilter {
    delay: InterpolatedDelay,
    feedback: f32,
}

impl AllpassFilter {
    /// Creates an allpass delaying by `delay_samples` (at least one).
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
        }
    }

    /// Sets the allpass gain. Clamped to ±0.99 for stability.
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Current allpass gain.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read((self.delay.capacity() - 1) as f32);
        let w = flush_denormal(input + self.feedback * delayed);
        self.delay.write(w);
        delayed - self.feedback * w
    }

    /// Zeroes the internal delay.
    pub fn clear(&mut self) {
        self.delay.clear();
    }

    /// Delay length in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }
}

/// Allpass whose delay length is swept by an external modulation signal.
///
/// Used in the plate tank to break up metallic ringing.
#[derive(Debug, Clone)]
pub struct ModulatedAllpass {
    delay: InterpolatedDelay,
    base_delay: f32,
    depth: f32,
    feedback: f32,
}

impl ModulatedAllpass {
    /// Creates an allpass centered on `base_delay` samples that can swing by
    /// up to `max_depth` samples either way.
    pub fn new(base_delay: f32, max_depth: f32) -> Self {
        let base_delay = base_delay.max(1.0);
        let max_depth = max_depth.max(0.0);
        let capacity = (base_delay + max_depth) as usize + 2;
        Self {
            delay: InterpolatedDelay::new(capacity),
            base_delay,
            depth: 0.0,
            feedback: 0.5,
        }
    }

    /// Sets the modulation excursion in samples, limited to what the buffer holds.
    pub fn set_depth(&mut self, depth_samples: f32) {
        let room = (self.delay.capacity() as f32 - 2.0 - self.base_delay).max(0.0);
        self.depth = depth_samples.clamp(0.0, room.min(self.base_delay - 1.0).max(0.0));
    }

    /// Sets the allpass gain. Clamped to ±0.99 for stability.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(-0.99, 0.99);
    }

    /// Processes one sample with `modulation` in [-1.0, 1.0].
    #[inline]
    pub fn process(&mut self, input: f32, modulation: f32) -> f32 {
        let delay = self.base_delay + self.depth * modulation.clamp(-1.0, 1.0);
        let delayed = self.delay.read(delay - 1.0);
        let w = flush_denormal(input + self.feedback * delayed);
        self.delay.write(w);
        delayed - self.feedback * w
    }

    /// Zeroes the internal delay.
    pub fn clear(&mut self) {
        self.delay.clear();
    }
}
