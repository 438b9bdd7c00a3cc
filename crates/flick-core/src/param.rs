//! Exponentially smoothed parameter.
//!
//! Knob values arrive once per block; the signal chain wants them to glide
//! per sample. [`SmoothedParam`] is a one-pole low-pass on the control value:
//!
//! ```text
//! y[n] = y[n-1] + coeff * (target - y[n-1]),  coeff = 1 - exp(-1 / (tau * sample_rate))
//! ```
//!
//! After five time constants the value is within 1% of the target.
//!
//! ```rust
//! use flick_core::SmoothedParam;
//!
//! let mut time = SmoothedParam::with_config(2400.0, 48000.0, 100.0);
//! time.set_target(24000.0);
//! let first = time.advance();
//! assert!(first > 2400.0 && first < 24000.0);
//! ```

use libm::expf;

/// A control value that approaches its target exponentially.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Creates an unsmoothed parameter (changes apply instantly).
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Creates a parameter with time constant `smoothing_time_ms`.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Sets the value to glide toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jumps to `value` with no glide.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Changes the time constant. 0 disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value is within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jumps to the current target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            1.0
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            1.0 - expf(-1.0 / samples)
        };
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
