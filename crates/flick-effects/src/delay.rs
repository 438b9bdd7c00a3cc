//! Stereo feedback echo.
//!
//! Each channel owns an independent line sized for [`MAX_DELAY_SECONDS`] at
//! construction. The delay time glides toward its target so tempo changes
//! bend pitch briefly instead of clicking.

use flick_core::{InterpolatedDelay, SmoothedParam, flush_denormal};

use crate::params::MAX_DELAY_SECONDS;

/// Time constant of the delay-time glide.
pub const DELAY_TIME_SMOOTHING_MS: f32 = 100.0;
/// Attenuation of the wet leg, leaving headroom for high feedback.
pub const WET_ATTENUATION: f32 = 0.333;
/// Highest feedback the loop accepts.
pub const MAX_FEEDBACK: f32 = 0.98;

/// Two-channel echo with shared time and feedback.
#[derive(Debug, Clone)]
pub struct StereoDelay {
    lines: [InterpolatedDelay; 2],
    time: SmoothedParam,
    feedback: f32,
}

impl StereoDelay {
    /// Allocates both lines for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let line = InterpolatedDelay::from_time(sample_rate, MAX_DELAY_SECONDS);
        let max = Self::max_time_for(&line);
        Self {
            lines: [line.clone(), line],
            time: SmoothedParam::with_config(max.min(sample_rate * 0.05), sample_rate, DELAY_TIME_SMOOTHING_MS),
            feedback: 0.0,
        }
    }

    fn max_time_for(line: &InterpolatedDelay) -> f32 {
        line.capacity() as f32 - 1.0
    }

    /// Longest delay the lines hold, in samples.
    pub fn max_time_samples(&self) -> f32 {
        Self::max_time_for(&self.lines[0])
    }

    /// Sets the target delay time. Clamped to `[1, max_time_samples]`.
    pub fn set_time_samples(&mut self, samples: f32) {
        let samples = if samples.is_finite() { samples } else { 1.0 };
        self.time.set_target(samples.clamp(1.0, self.max_time_samples()));
    }

    /// Current (smoothed) delay time in samples.
    pub fn time_samples(&self) -> f32 {
        self.time.get()
    }

    /// Target delay time in samples.
    pub fn target_time_samples(&self) -> f32 {
        self.time.target()
    }

    /// Sets the loop gain, clamped to `[0, MAX_FEEDBACK]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = if feedback.is_nan() { 0.0 } else { feedback.clamp(0.0, MAX_FEEDBACK) };
    }

    /// Runs the lines for one frame and returns the delayed signal.
    #[inline]
    pub fn tick(&mut self, left: f32, right: f32) -> (f32, f32) {
        let delay = self.time.advance();
        let feedback = self.feedback;
        let mut step = |line: &mut InterpolatedDelay, input: f32| {
            let out = line.read(delay - 1.0);
            line.write(flush_denormal(input + out * feedback));
            out
        };
        let wet_l = step(&mut self.lines[0], left);
        let wet_r = step(&mut self.lines[1], right);
        (wet_l, wet_r)
    }

    /// Processes one frame and blends it with the dry signal.
    ///
    /// `mix` is the delay amount 0..1; `makeup` multiplies the dry leg.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32, mix: f32, makeup: f32) -> (f32, f32) {
        let mix = mix.clamp(0.0, 1.0);
        let (wet_l, wet_r) = self.tick(left, right);
        let blend = |dry: f32, wet: f32| mix * wet * WET_ATTENUATION + (1.0 - mix) * dry * makeup;
        (blend(left, wet_l), blend(right, wet_r))
    }

    /// Keeps the loop recirculating with no new input, for when the effect
    /// is bypassed.
    #[inline]
    pub fn idle(&mut self) {
        self.tick(0.0, 0.0);
    }

    /// Zeroes both lines.
    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(InterpolatedDelay::clear);
    }
}
