//! Hall reverb: eight parallel damped combs into four series allpasses per
//! channel (Freeverb topology).
//!
//! The hall has a single fixed voicing. [`ReverbEngine::configure`] is a
//! no-op.

use flick_core::{AllpassFilter, CombFilter};

use super::{ReverbEngine, ReverbParams};

/// Comb loop lengths at 44.1 kHz. Mutually prime to avoid stacked resonances.
const COMB_TUNINGS_44K: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS_44K: [usize; 4] = [556, 441, 341, 225];
const REFERENCE_RATE: f32 = 44100.0;
/// Extra length on every right-channel line.
const STEREO_SPREAD: usize = 23;

const FEEDBACK: f32 = 0.95;
const DAMPING: f32 = 0.2;
const INPUT_GAIN: f32 = 0.015;
const ALLPASS_GAIN: f32 = 0.5;
const OUTPUT_GAIN: f32 = 4.0;

fn scale_to_rate(samples: usize, target_rate: f32) -> usize {
    ((samples as f32 * target_rate / REFERENCE_RATE).round() as usize).max(1)
}

#[derive(Debug, Clone)]
struct HallChannel {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl HallChannel {
    fn new(sample_rate: f32, spread: usize) -> Self {
        let combs = core::array::from_fn(|i| {
            let mut comb = CombFilter::new(scale_to_rate(COMB_TUNINGS_44K[i] + spread, sample_rate));
            comb.set_feedback(FEEDBACK);
            comb.set_damp(DAMPING);
            comb
        });
        let allpasses = core::array::from_fn(|i| {
            let mut ap = AllpassFilter::new(scale_to_rate(ALLPASS_TUNINGS_44K[i] + spread, sample_rate));
            ap.set_feedback(ALLPASS_GAIN);
            ap
        });
        Self { combs, allpasses }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let sum: f32 = self.combs.iter_mut().map(|c| c.process(input)).sum();
        self.allpasses.iter_mut().fold(sum, |acc, ap| ap.process(acc))
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::clear);
        self.allpasses.iter_mut().for_each(AllpassFilter::clear);
    }
}

/// Fixed-voicing stereo hall.
#[derive(Debug, Clone)]
pub struct HallReverb {
    left: HallChannel,
    right: HallChannel,
}

impl HallReverb {
    /// Builds the comb and allpass banks for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            left: HallChannel::new(sample_rate, 0),
            right: HallChannel::new(sample_rate, STEREO_SPREAD),
        }
    }
}

impl ReverbEngine for HallReverb {
    fn configure(&mut self, _params: &ReverbParams) {}

    #[inline]
    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let input = (left + right) * INPUT_GAIN;
        (
            self.left.process(input) * OUTPUT_GAIN,
            self.right.process(input) * OUTPUT_GAIN,
        )
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
