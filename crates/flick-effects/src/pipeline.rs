//! The per-sample signal chain.
//!
//! ```text
//! in -> routing -> notches -> delay -> tremolo -> limit -> reverb send -+-> reverb -+
//!                                                                       |           |
//!                                                                       +-- dry ----+-> mix -> output routing
//! ```
//!
//! [`Pipeline::update`] is called once per block with the fresh
//! [`EffectParameters`]; [`Pipeline::process_frame`] then runs for every
//! sample. Nothing here allocates after [`Pipeline::new`].

use flick_core::{db_to_linear, hard_clip};

use crate::delay::StereoDelay;
use crate::notch::NotchStage;
use crate::params::{EffectParameters, MonoStereoMode};
use crate::reverb::{ReverbEngine, ReverbSelector, ReverbType};
use crate::tremolo::Tremolo;

/// Gain at the reverb input: -18 dB and -20 dB pads, then eight times
/// amplification.
pub fn reverb_send_gain() -> f32 {
    db_to_linear(-18.0) * db_to_linear(-20.0) * 8.0
}

/// Block-rate values the sample loop reads, derived from [`EffectParameters`].
#[derive(Debug, Clone, Copy)]
struct FrameSettings {
    mono_stereo: MonoStereoMode,
    delay_active: bool,
    delay_mix: f32,
    delay_makeup: f32,
    tremolo_active: bool,
    tremolo_makeup: f32,
    reverb_active: bool,
    send_scale: f32,
    reverse_scale: f32,
    send_gain: f32,
    dry_level: f32,
    wet_level: f32,
}

impl FrameSettings {
    fn from_params(params: &EffectParameters) -> Self {
        let (send_scale, reverse_scale) = params.mono_stereo.reverb_scales();
        let wet = if params.reverb_wet.is_nan() { 0.0 } else { params.reverb_wet.clamp(0.0, 1.0) };
        let mix = if params.delay_mix_percent.is_nan() { 0.0 } else { params.delay_mix_percent / 100.0 };
        Self {
            mono_stereo: params.mono_stereo,
            delay_active: !params.bypass.delay,
            delay_mix: mix.clamp(0.0, 1.0),
            delay_makeup: params.makeup_gain.delay_gain(),
            tremolo_active: !params.bypass.tremolo,
            tremolo_makeup: params.makeup_gain.tremolo_gain(),
            reverb_active: !params.bypass.reverb,
            send_scale,
            reverse_scale,
            send_gain: reverb_send_gain(),
            dry_level: params.reverb_mix.dry_level(wet),
            wet_level: wet,
        }
    }
}

/// Routing, fixed notches, delay, tremolo and reverb for one stereo stream.
#[derive(Debug, Clone)]
pub struct Pipeline {
    sample_rate: f32,
    notch: NotchStage,
    delay: StereoDelay,
    tremolo: Tremolo,
    reverb: ReverbSelector,
    frame: FrameSettings,
}

impl Pipeline {
    /// Allocates every buffer for `sample_rate` and applies neutral parameters.
    pub fn new(sample_rate: f32) -> Self {
        let params = EffectParameters::new(sample_rate);
        let mut pipeline = Self {
            sample_rate,
            notch: NotchStage::new(sample_rate),
            delay: StereoDelay::new(sample_rate),
            tremolo: Tremolo::new(sample_rate),
            reverb: ReverbSelector::new(sample_rate),
            frame: FrameSettings::from_params(&params),
        };
        pipeline.update(&params);
        pipeline
    }

    /// Sample rate the pipeline was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Applies one block's parameters.
    pub fn update(&mut self, params: &EffectParameters) {
        self.frame = FrameSettings::from_params(params);

        self.reverb.select(params.reverb_type);
        self.reverb.configure(&params.reverb);

        self.tremolo.configure(params.tremolo_speed_hz, params.tremolo_depth, params.tremolo_mode);

        self.delay.set_time_samples(params.delay_time_samples * params.delay_subdivision.beats());
        self.delay.set_feedback(params.delay_feedback);
    }

    /// Processes one stereo frame.
    #[inline]
    pub fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        let f = self.frame;

        let right = if f.mono_stereo.is_mono_input() { left } else { right };
        let (mut l, mut r) = self.notch.process(left, right);

        if f.delay_active {
            (l, r) = self.delay.process(l, r, f.delay_mix, f.delay_makeup);
        } else {
            self.delay.idle();
        }

        if f.tremolo_active {
            (l, r) = self.tremolo.process(l, r, f.tremolo_makeup);
        } else {
            self.tremolo.idle();
        }

        let send_l = hard_clip(l, 1.0) * f.send_scale;
        let send_r = hard_clip(r, 1.0) * f.send_scale;
        let (rev_l, rev_r) = self.reverb.process(send_l * f.send_gain, send_r * f.send_gain);

        if f.reverb_active {
            let mix = |dry: f32, wet: f32| dry * f.dry_level * f.reverse_scale + wet * f.wet_level;
            l = mix(send_l, rev_l);
            r = mix(send_r, rev_r);
        }

        match f.mono_stereo {
            MonoStereoMode::Mimo => (l * 0.5 + r * 0.5, 0.0),
            MonoStereoMode::Miso | MonoStereoMode::Siso => (l, r),
        }
    }

    /// Processes one block. All four slices must have the same length;
    /// extra samples in longer slices are left untouched.
    pub fn process_block(&mut self, in_l: &[f32], in_r: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = in_l.iter().zip(in_r).zip(out_l.iter_mut().zip(out_r.iter_mut()));
        for ((&l, &r), (ol, or)) in frames {
            (*ol, *or) = self.process_frame(l, r);
        }
    }

    /// Flushes every reverb tail. Called when the reverb is switched off.
    pub fn clear_reverb(&mut self) {
        self.reverb.clear();
    }

    /// Zeroes all signal memory, delay lines and filter state included.
    /// LFO phase and parameter smoothing are kept.
    pub fn clear(&mut self) {
        self.notch.clear();
        self.reverb.clear();
        self.delay.clear();
        self.tremolo.clear();
    }

    /// Latest tremolo gain envelope, for the status LED.
    pub fn tremolo_envelope(&self) -> f32 {
        self.tremolo.envelope()
    }

    /// Current smoothed delay time in samples.
    pub fn delay_time_samples(&self) -> f32 {
        self.delay.time_samples()
    }

    /// Target delay time in samples, after the subdivision.
    pub fn target_delay_time_samples(&self) -> f32 {
        self.delay.target_time_samples()
    }

    /// Current tremolo rate in Hz.
    pub fn tremolo_rate_hz(&self) -> f32 {
        self.tremolo.rate_hz()
    }

    /// Current scaled tremolo depth.
    pub fn tremolo_depth(&self) -> f32 {
        self.tremolo.depth()
    }

    /// Engine currently fed by the send.
    pub fn reverb_type(&self) -> ReverbType {
        self.reverb.active()
    }
}
