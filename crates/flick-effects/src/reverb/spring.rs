//! Spring tank: a chain of short allpasses gives the dispersive "boing",
//! followed by gentle saturation, damping and a recirculating spring delay.
//!
//! ```text
//! in + fb -> 8 dispersion allpasses -> chaos clip -> damping LP -> spring delay -+-> out
//!      ^                                                                         |
//!      +---------------------------- x decay ------------------------------------+
//! ```
//!
//! Decay 0.7, damping 7 kHz, fully wet. [`ReverbEngine::configure`] is a no-op.

use flick_core::{AllpassFilter, InterpolatedDelay, OnePole, flush_denormal};

use super::{ReverbEngine, ReverbParams};

const DISPERSION_STAGES: usize = 8;
/// Spring tension. Sets the spread of the dispersion delays.
const TENSION: f32 = 0.6;
const BASE_DISPERSION_MS: f32 = 1.7;
const RIGHT_OFFSET_MS: f32 = 0.7;
const DAMPING_HZ: f32 = 7000.0;
/// Allpass gain loss from damping (0 bright, 1 dull).
const DISPERSION_DAMPING: f32 = 0.3;
const DECAY: f32 = 0.7;
const CHAOS: f32 = 0.1;
const LEFT_SPRING_MS: f32 = 33.0;
const RIGHT_SPRING_MS: f32 = 41.0;

#[derive(Debug, Clone)]
struct SpringChannel {
    dispersion: [AllpassFilter; DISPERSION_STAGES],
    damping: OnePole,
    spring: InterpolatedDelay,
    spring_len: f32,
    feedback: f32,
}

impl SpringChannel {
    fn new(sample_rate: f32, offset_ms: f32, spring_ms: f32) -> Self {
        let dispersion = core::array::from_fn(|i| {
            let frac = i as f32 / (DISPERSION_STAGES - 1) as f32;
            let ms = BASE_DISPERSION_MS * (1.0 + frac * 2.5 * TENSION) + offset_ms;
            let mut ap = AllpassFilter::new((ms * 0.001 * sample_rate) as usize);
            ap.set_feedback(0.5 + 0.3 * (1.0 - DISPERSION_DAMPING) * (1.0 - frac * 0.5));
            ap
        });
        let spring_len = spring_ms * 0.001 * sample_rate;
        Self {
            dispersion,
            damping: OnePole::new(sample_rate, DAMPING_HZ),
            spring: InterpolatedDelay::new(spring_len as usize + 2),
            spring_len,
            feedback: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let x = input + self.feedback * DECAY;
        let y = self.dispersion.iter_mut().fold(x, |acc, ap| ap.process(acc));
        let y = y + CHAOS * (libm::tanhf(3.0 * y) / 3.0 - y);
        let y = self.damping.process(y);
        self.spring.write(y);
        let out = self.spring.read(self.spring_len);
        self.feedback = flush_denormal(out);
        out
    }

    fn clear(&mut self) {
        self.dispersion.iter_mut().for_each(AllpassFilter::clear);
        self.damping.reset();
        self.spring.clear();
        self.feedback = 0.0;
    }
}

/// Fixed-voicing stereo spring.
#[derive(Debug, Clone)]
pub struct SpringReverb {
    left: SpringChannel,
    right: SpringChannel,
}

impl SpringReverb {
    /// Builds both spring channels for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            left: SpringChannel::new(sample_rate, 0.0, LEFT_SPRING_MS),
            right: SpringChannel::new(sample_rate, RIGHT_OFFSET_MS, RIGHT_SPRING_MS),
        }
    }
}

impl ReverbEngine for SpringReverb {
    fn configure(&mut self, _params: &ReverbParams) {}

    #[inline]
    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.process(left), self.right.process(right))
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
