//! Three-mode stereo tremolo.
//!
//! - **Sine / Square**: the signal is multiplied by `dc_offset + lfo`, where
//!   the LFO amplitude is the scaled depth and `dc_offset = 1 - depth`, so the
//!   gain swings between `1 - 2*depth` and unity.
//! - **Harmonic**: the signal is split into a low band (one-pole low-pass at
//!   [`HARMONIC_LOW_CROSSOVER_HZ`]) and a high band (one-pole high-pass at
//!   [`HARMONIC_HIGH_CROSSOVER_HZ`]). The bands are modulated by `1 + lfo` and
//!   `1 - lfo`, recombined, and voiced by a fixed filter chain modelled on a
//!   vintage harmonic-tremolo amp.
//!
//! The LFO advances every sample even while bypassed, so re-enabling the
//! effect continues the cycle instead of restarting it.

use flick_core::{Biquad, Lfo, LfoWaveform, OnePole, OnePoleHighpass, biquad};

use crate::params::{MAX_TREMOLO_HZ, MIN_TREMOLO_HZ, TremoloMode};

/// Low band crossover of the harmonic mode.
pub const HARMONIC_LOW_CROSSOVER_HZ: f32 = 144.0;
/// High band crossover of the harmonic mode.
pub const HARMONIC_HIGH_CROSSOVER_HZ: f32 = 636.0;

/// Post-recombination voicing for one channel of the harmonic mode.
#[derive(Debug, Clone)]
struct HarmonicVoicing {
    highpass: OnePoleHighpass,
    lowpass: OnePole,
    low_shelf: Biquad,
    low_mid_peak: Biquad,
    presence_cut: Biquad,
}

impl HarmonicVoicing {
    fn new(sample_rate: f32) -> Self {
        Self {
            highpass: OnePoleHighpass::new(sample_rate, 63.0),
            lowpass: OnePole::new(sample_rate, 11_200.0),
            low_shelf: Biquad::with_coefficients(biquad::low_shelf(37.0, 1.0, -10.5, sample_rate)),
            low_mid_peak: Biquad::with_coefficients(biquad::peaking(254.0, 0.707, 2.0, sample_rate)),
            presence_cut: Biquad::with_coefficients(biquad::peaking(7500.0, 0.263, -3.37, sample_rate)),
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let x = self.highpass.process(x);
        let x = self.lowpass.process(x);
        let x = self.low_shelf.process(x);
        let x = self.low_mid_peak.process(x);
        self.presence_cut.process(x)
    }

    fn clear(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
        self.low_shelf.clear();
        self.low_mid_peak.clear();
        self.presence_cut.clear();
    }
}

/// Band splitter and voicing for one channel.
#[derive(Debug, Clone)]
struct HarmonicChannel {
    low: OnePole,
    high: OnePoleHighpass,
    voicing: HarmonicVoicing,
}

impl HarmonicChannel {
    fn new(sample_rate: f32) -> Self {
        Self {
            low: OnePole::new(sample_rate, HARMONIC_LOW_CROSSOVER_HZ),
            high: OnePoleHighpass::new(sample_rate, HARMONIC_HIGH_CROSSOVER_HZ),
            voicing: HarmonicVoicing::new(sample_rate),
        }
    }

    #[inline]
    fn process(&mut self, x: f32, lfo: f32, makeup: f32) -> f32 {
        let low = self.low.process(x) * (1.0 + lfo);
        let high = self.high.process(x) * (1.0 - lfo);
        self.voicing.process((low + high) * makeup)
    }

    fn clear(&mut self) {
        self.low.reset();
        self.high.reset();
        self.voicing.clear();
    }
}

/// Stereo tremolo sharing one LFO between channels.
#[derive(Debug, Clone)]
pub struct Tremolo {
    lfo: Lfo,
    mode: TremoloMode,
    dc_offset: f32,
    envelope: f32,
    channels: [HarmonicChannel; 2],
}

impl Tremolo {
    /// Creates a sine tremolo at 4 Hz with zero depth.
    pub fn new(sample_rate: f32) -> Self {
        let mut lfo = Lfo::new(sample_rate, 4.0);
        lfo.set_amplitude(0.0);
        Self {
            lfo,
            mode: TremoloMode::Sine,
            dc_offset: 1.0,
            envelope: 1.0,
            channels: [HarmonicChannel::new(sample_rate), HarmonicChannel::new(sample_rate)],
        }
    }

    /// Applies the block's rate, depth knob and mode.
    ///
    /// The rate is clamped to [`MIN_TREMOLO_HZ`, `MAX_TREMOLO_HZ`] and the
    /// depth is scaled by [`TremoloMode::scaled_depth`].
    pub fn configure(&mut self, rate_hz: f32, depth_knob: f32, mode: TremoloMode) {
        let rate = if rate_hz.is_finite() { rate_hz.clamp(MIN_TREMOLO_HZ, MAX_TREMOLO_HZ) } else { MIN_TREMOLO_HZ };
        self.lfo.set_frequency(rate);
        self.lfo.set_waveform(match mode {
            TremoloMode::Square => LfoWaveform::RoundedSquare,
            TremoloMode::Sine | TremoloMode::Harmonic => LfoWaveform::Sine,
        });
        let depth = mode.scaled_depth(depth_knob);
        self.lfo.set_amplitude(depth);
        self.dc_offset = 1.0 - depth;
        self.mode = mode;
    }

    /// Current scaled depth (the LFO amplitude).
    pub fn depth(&self) -> f32 {
        self.lfo.amplitude()
    }

    /// Current LFO rate in Hz.
    pub fn rate_hz(&self) -> f32 {
        self.lfo.frequency()
    }

    /// Active mode.
    pub fn mode(&self) -> TremoloMode {
        self.mode
    }

    /// Most recent gain envelope `dc_offset + lfo`, used to pulse the LED.
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Advances the LFO by one sample and returns its value.
    #[inline]
    fn step_lfo(&mut self) -> f32 {
        let lfo = self.lfo.next();
        self.envelope = self.dc_offset + lfo;
        lfo
    }

    /// Processes one frame, with `makeup` applied to the output.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32, makeup: f32) -> (f32, f32) {
        let lfo = self.step_lfo();
        match self.mode {
            TremoloMode::Sine | TremoloMode::Square => {
                let gain = self.envelope * makeup;
                (left * gain, right * gain)
            }
            TremoloMode::Harmonic => {
                let [ch_l, ch_r] = &mut self.channels;
                (ch_l.process(left, lfo, makeup), ch_r.process(right, lfo, makeup))
            }
        }
    }

    /// Advances the LFO without touching audio, for when the effect is bypassed.
    #[inline]
    pub fn idle(&mut self) {
        self.step_lfo();
    }

    /// Clears the harmonic filter memory. LFO phase is kept.
    pub fn clear(&mut self) {
        self.channels.iter_mut().for_each(HarmonicChannel::clear);
    }
}
