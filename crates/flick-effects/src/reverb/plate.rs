//! Figure-eight plate tank after Dattorro (1997).
//!
//! ```text
//! in -> pre-delay -> band-limit -> 4 input diffusers -+-> left tank --+
//!                                                     |     ^         |
//!                                                     |     +--x------+-- cross-feed
//!                                                     +-> right tank -+
//! ```
//!
//! Each tank half is a modulated allpass, a delay, damping, a decay gain, a
//! second allpass and a second delay. The outputs are tapped from the four
//! tank delays. Delay lengths are the published values for 29761 Hz,
//! rescaled to the running sample rate.

use flick_core::{
    AllpassFilter, InterpolatedDelay, Lfo, LfoWaveform, ModulatedAllpass, OnePole, OnePoleHighpass, lerp,
    pitch_to_hz,
};

use super::{ReverbEngine, ReverbParams};

const REFERENCE_RATE: f32 = 29761.0;
/// Overall size trim applied to every delay length.
const TIME_SCALE: f32 = 1.0075;
/// Low cut in the input and tank, in pitch units (about 100 Hz).
const LOW_CUT_PITCH: f32 = 2.87;
const MAX_PRE_DELAY_SECONDS: f32 = 0.25;
/// Tank modulation rate per unit of `mod_speed`, in Hz.
const MOD_SPEED_SCALE: f32 = 8.0;
/// Tank modulation excursion per unit of `mod_depth`, in reference samples.
const MOD_DEPTH_SCALE: f32 = 15.0;
const DECAY_CEILING: f32 = 0.97;
const OUTPUT_GAIN: f32 = 0.6;

const INPUT_DIFFUSERS: [(f32, f32); 4] = [(142.0, 0.75), (107.0, 0.75), (379.0, 0.625), (277.0, 0.625)];

/// Delay lengths of one tank half: modulated allpass, delay 1, allpass, delay 2.
struct HalfTuning {
    mod_allpass: f32,
    delay1: f32,
    allpass: f32,
    delay2: f32,
    lfo_phase: f32,
}

const LEFT: HalfTuning = HalfTuning {
    mod_allpass: 672.0,
    delay1: 4453.0,
    allpass: 1800.0,
    delay2: 3720.0,
    lfo_phase: 0.0,
};

const RIGHT: HalfTuning = HalfTuning {
    mod_allpass: 908.0,
    delay1: 4217.0,
    allpass: 2656.0,
    delay2: 3163.0,
    lfo_phase: 0.25,
};

/// Output taps: (tap position in reference samples, sign) on the opposite
/// half's delay 1, that half's delay 2, then own delay 1 and delay 2.
const LEFT_TAPS: ([f32; 2], f32, f32, f32) = ([266.0, 2974.0], 1996.0, 1990.0, 1066.0);
const RIGHT_TAPS: ([f32; 2], f32, f32, f32) = ([353.0, 3627.0], 2673.0, 2111.0, 121.0);

#[derive(Debug, Clone)]
struct TankHalf {
    mod_allpass: ModulatedAllpass,
    delay1: InterpolatedDelay,
    delay1_len: f32,
    damping: OnePole,
    low_cut: OnePoleHighpass,
    allpass: AllpassFilter,
    delay2: InterpolatedDelay,
    delay2_len: f32,
    sine: Lfo,
    triangle: Lfo,
    output: f32,
}

impl TankHalf {
    fn new(tuning: &HalfTuning, scale: f32, sample_rate: f32) -> Self {
        let delay1_len = tuning.delay1 * scale;
        let delay2_len = tuning.delay2 * scale;
        let mut sine = Lfo::new(sample_rate, 0.8);
        let mut triangle = Lfo::new(sample_rate, 0.8);
        triangle.set_waveform(LfoWaveform::Triangle);
        sine.set_phase(tuning.lfo_phase);
        triangle.set_phase(tuning.lfo_phase);
        Self {
            mod_allpass: ModulatedAllpass::new(tuning.mod_allpass * scale, MOD_DEPTH_SCALE * scale + 1.0),
            delay1: InterpolatedDelay::new(delay1_len as usize + 2),
            delay1_len,
            damping: OnePole::new(sample_rate, pitch_to_hz(7.25)),
            low_cut: OnePoleHighpass::new(sample_rate, pitch_to_hz(LOW_CUT_PITCH)),
            allpass: AllpassFilter::new((tuning.allpass * scale) as usize),
            delay2: InterpolatedDelay::new(delay2_len as usize + 2),
            delay2_len,
            sine,
            triangle,
            output: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, decay: f32, shape: f32) -> f32 {
        let modulation = lerp(self.triangle.next(), self.sine.next(), shape);
        let a = self.mod_allpass.process(input, modulation);
        self.delay1.write(a);
        let b = self.delay1.read(self.delay1_len);
        let c = self.low_cut.process(self.damping.process(b)) * decay;
        let d = self.allpass.process(c);
        self.delay2.write(d);
        self.output = self.delay2.read(self.delay2_len);
        self.output
    }

    fn clear(&mut self) {
        self.mod_allpass.clear();
        self.delay1.clear();
        self.damping.reset();
        self.low_cut.reset();
        self.allpass.clear();
        self.delay2.clear();
        self.output = 0.0;
    }
}

/// Configurable plate reverb.
#[derive(Debug, Clone)]
pub struct PlateReverb {
    sample_rate: f32,
    scale: f32,
    pre_delay: InterpolatedDelay,
    pre_delay_samples: f32,
    input_high_cut: OnePole,
    input_low_cut: OnePoleHighpass,
    diffusers: [AllpassFilter; 4],
    left: TankHalf,
    right: TankHalf,
    decay: f32,
    mod_shape: f32,
}

impl PlateReverb {
    /// Builds the tank for `sample_rate` with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let scale = sample_rate / REFERENCE_RATE * TIME_SCALE;
        let diffusers = INPUT_DIFFUSERS.map(|(len, gain)| {
            let mut ap = AllpassFilter::new((len * scale) as usize);
            ap.set_feedback(gain);
            ap
        });
        let mut plate = Self {
            sample_rate,
            scale,
            pre_delay: InterpolatedDelay::from_time(sample_rate, MAX_PRE_DELAY_SECONDS),
            pre_delay_samples: 0.0,
            input_high_cut: OnePole::new(sample_rate, pitch_to_hz(7.25)),
            input_low_cut: OnePoleHighpass::new(sample_rate, pitch_to_hz(LOW_CUT_PITCH)),
            diffusers,
            left: TankHalf::new(&LEFT, scale, sample_rate),
            right: TankHalf::new(&RIGHT, scale, sample_rate),
            decay: 0.0,
            mod_shape: 0.0,
        };
        plate.configure(&ReverbParams::default());
        plate
    }

    #[inline]
    fn tap(&self, line: &InterpolatedDelay, position: f32) -> f32 {
        line.read(position * self.scale)
    }
}

impl ReverbEngine for PlateReverb {
    fn configure(&mut self, params: &ReverbParams) {
        let p = params.sanitized();
        self.decay = p.decay * DECAY_CEILING;
        self.mod_shape = p.mod_shape;
        self.pre_delay_samples = p.pre_delay * self.sample_rate;
        self.input_high_cut.set_frequency(pitch_to_hz(p.input_high_cut));

        let mod_rate = p.mod_speed * MOD_SPEED_SCALE;
        let mod_depth = p.mod_depth * MOD_DEPTH_SCALE * self.scale;
        for half in [&mut self.left, &mut self.right] {
            half.damping.set_frequency(pitch_to_hz(p.tank_high_cut));
            half.mod_allpass.set_feedback(-0.7 * p.diffusion);
            half.mod_allpass.set_depth(mod_depth);
            half.allpass.set_feedback(0.5 * p.diffusion);
            half.sine.set_frequency(mod_rate);
            half.triangle.set_frequency(mod_rate);
        }
    }

    #[inline]
    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.pre_delay.write((left + right) * 0.5);
        let x = self.pre_delay.read(self.pre_delay_samples);
        let x = self.input_low_cut.process(self.input_high_cut.process(x));
        let x = self.diffusers.iter_mut().fold(x, |acc, ap| ap.process(acc));

        let feed_left = x + self.right.output * self.decay;
        let feed_right = x + self.left.output * self.decay;
        self.left.process(feed_left, self.decay, self.mod_shape);
        self.right.process(feed_right, self.decay, self.mod_shape);

        let (l_from, l_d2, l_own1, l_own2) = LEFT_TAPS;
        let out_l = self.tap(&self.right.delay1, l_from[0]) + self.tap(&self.right.delay1, l_from[1])
            + self.tap(&self.right.delay2, l_d2)
            - self.tap(&self.left.delay1, l_own1)
            - self.tap(&self.left.delay2, l_own2);

        let (r_from, r_d2, r_own1, r_own2) = RIGHT_TAPS;
        let out_r = self.tap(&self.left.delay1, r_from[0]) + self.tap(&self.left.delay1, r_from[1])
            + self.tap(&self.left.delay2, r_d2)
            - self.tap(&self.right.delay1, r_own1)
            - self.tap(&self.right.delay2, r_own2);

        (out_l * OUTPUT_GAIN, out_r * OUTPUT_GAIN)
    }

    fn clear(&mut self) {
        self.pre_delay.clear();
        self.input_high_cut.reset();
        self.input_low_cut.reset();
        self.diffusers.iter_mut().for_each(AllpassFilter::clear);
        self.left.clear();
        self.right.clear();
    }
}
