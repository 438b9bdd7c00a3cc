//! The pedal-mode state machine.
//!
//! [`ModeController`] owns the live [`EffectParameters`]. Once per audio
//! block it consumes the footswitch gestures ([`ModeController::on_event`]),
//! then maps the knobs and toggles onto the parameters for the active mode
//! ([`ModeController::refresh`]), and finally computes the LED pattern
//! ([`ModeController::leds`]).
//!
//! | mode | enter | leave |
//! |------|-------|-------|
//! | `Normal` | boot | |
//! | `EditReverb` | long FS1 | FS1 discard, FS2 save |
//! | `EditMonoStereo` | long FS2 | FS1 discard, FS2 save |
//! | `TapTempo` | double FS1 | FS1, or 5 s without a tap |

use flick_config::{PersistedSettings, SettingsStore};
use flick_core::{NoteDivision, lerp, log_scale};
use flick_effects::{
    BypassState, EffectParameters, MAX_DELAY_SECONDS, MAX_TREMOLO_HZ, MIN_DELAY_SECONDS, MIN_TREMOLO_HZ,
    MakeupGain, MonoStereoMode, ReverbMix, ReverbType, TremoloMode,
};

use crate::gesture::{DOUBLE_PRESS_WINDOW_MS, Footswitch, FootswitchEvent, Gesture};
use crate::snapshot::ControlSnapshot;
use crate::soft_takeover::{KnobTakeover, SwitchTakeover};
use crate::tap_tempo::{TapResult, TapTargets, TapTempoEngine};

/// Toggle 1 in Normal: dry policy.
const REVERB_MIX_TABLE: [ReverbMix; 3] = [ReverbMix::AllWet, ReverbMix::Crossfade, ReverbMix::AllDry];
/// Toggle 2 in Normal: tremolo algorithm.
const TREMOLO_MODE_TABLE: [TremoloMode; 3] = [TremoloMode::Square, TremoloMode::Harmonic, TremoloMode::Sine];
/// Toggle 3 in EditMonoStereo.
const MONO_STEREO_TABLE: [MonoStereoMode; 3] = [MonoStereoMode::Siso, MonoStereoMode::Miso, MonoStereoMode::Mimo];
/// Toggle 2 in EditMonoStereo.
const MAKEUP_TABLE: [MakeupGain; 3] = [MakeupGain::Heavy, MakeupGain::Normal, MakeupGain::None];
/// Toggles 1-3 in EditReverb: modulation speed, depth and shape.
const TANK_MOD_TABLE: [f32; 3] = [0.5, 0.25, 0.1];
/// Toggle 1 in TapTempo.
const SUBDIVISION_TABLE: [NoteDivision; 3] = [NoteDivision::Quarter, NoteDivision::DottedEighth, NoteDivision::Eighth];

const PRE_DELAY_KNOB_SCALE: f32 = 0.25;
const CUTOFF_KNOB_SCALE: f32 = 10.0;

const EDIT_BLINK_MS: u32 = 500;
const TAP_LEFT_LED: f32 = 0.5;
const TREMOLO_ONLY_LED_SCALE: f32 = 0.4;

/// Which mode the pedal is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedalMode {
    /// Effects toggled and played.
    Normal,
    /// Knobs and toggles edit the plate reverb.
    EditReverb,
    /// Toggles pick channel routing and makeup gain.
    EditMonoStereo,
    /// FS2 taps a tempo.
    TapTempo,
}

/// Request from the controller to the audio pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCommand {
    /// Flush the reverb tails.
    ClearReverb,
}

/// Intensity for both LEDs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedFrame {
    /// Left LED, 0..1.
    pub left: f32,
    /// Right LED, 0..1.
    pub right: f32,
}

#[derive(Debug, Clone, Copy)]
enum ModeState {
    Normal,
    EditReverb { entered_ms: u32 },
    EditMonoStereo { entered_ms: u32, entry_bypass: BypassState },
    TapTempo,
}

impl ModeState {
    fn mode(&self) -> PedalMode {
        match self {
            Self::Normal => PedalMode::Normal,
            Self::EditReverb { .. } => PedalMode::EditReverb,
            Self::EditMonoStereo { .. } => PedalMode::EditMonoStereo,
            Self::TapTempo => PedalMode::TapTempo,
        }
    }
}

/// Takeovers for the six knobs and three toggles while editing the plate.
#[derive(Debug, Clone, Copy, Default)]
struct ReverbEditCaptures {
    knobs: [KnobTakeover; 6],
    toggles: [SwitchTakeover<f32>; 3],
}

impl ReverbEditCaptures {
    fn capture(&mut self, params: &EffectParameters, c: &ControlSnapshot) {
        let r = &params.reverb;
        let values = [
            params.reverb_wet,
            r.pre_delay,
            r.decay,
            r.diffusion,
            r.input_high_cut,
            r.tank_high_cut,
        ];
        for ((knob, value), raw) in self.knobs.iter_mut().zip(values).zip(c.knobs) {
            knob.capture(value, raw);
        }
        let values = [r.mod_speed, r.mod_depth, r.mod_shape];
        for ((toggle, value), raw) in self.toggles.iter_mut().zip(values).zip(c.toggles) {
            toggle.capture(value, raw);
        }
    }

    fn refresh(&mut self, params: &mut EffectParameters, c: &ControlSnapshot) {
        let [wet, pre_delay, decay, diffusion, input_cut, tank_cut] = &mut self.knobs;
        let r = &mut params.reverb;
        params.reverb_wet = wet.process(c.knobs[0], |k| k);
        r.pre_delay = pre_delay.process(c.knobs[1], |k| k * PRE_DELAY_KNOB_SCALE);
        r.decay = decay.process(c.knobs[2], |k| k);
        r.diffusion = diffusion.process(c.knobs[3], |k| k);
        r.input_high_cut = input_cut.process(c.knobs[4], |k| k * CUTOFF_KNOB_SCALE);
        r.tank_high_cut = tank_cut.process(c.knobs[5], |k| k * CUTOFF_KNOB_SCALE);

        let [speed, depth, shape] = &mut self.toggles;
        r.mod_speed = speed.process(c.toggles[0], |p| p.select(&TANK_MOD_TABLE));
        r.mod_depth = depth.process(c.toggles[1], |p| p.select(&TANK_MOD_TABLE));
        r.mod_shape = shape.process(c.toggles[2], |p| p.select(&TANK_MOD_TABLE));
    }

    fn release(&mut self) {
        self.knobs.iter_mut().for_each(|k| k.release());
        self.toggles.iter_mut().for_each(|t| t.release());
    }
}

/// Takeovers that let a tapped tempo outrank the knobs.
#[derive(Debug, Clone, Copy, Default)]
struct TempoCaptures {
    delay_time: KnobTakeover,
    tremolo_speed: KnobTakeover,
    subdivision: SwitchTakeover<NoteDivision>,
}

/// Footswitch gesture handling, per-mode parameter mapping and LED patterns.
#[derive(Debug, Clone)]
pub struct ModeController {
    sample_rate: f32,
    state: ModeState,
    params: EffectParameters,
    reverb_edit: ReverbEditCaptures,
    tempo: TempoCaptures,
    tap: TapTempoEngine,
    // Flag value before the last NormalPress of each footswitch, so that the
    // DoublePress completing it can take the toggle back.
    undo: [Option<bool>; 2],
    // Press start of the FS1 NormalPress that switched the reverb off. The
    // tails are flushed only once that press can no longer become a double
    // press, so the undo brings back a live tail.
    pending_clear: Option<u32>,
}

impl ModeController {
    /// Controller in Normal mode with parameters from `record`.
    pub fn new(sample_rate: f32, record: &PersistedSettings) -> Self {
        let mut controller = Self {
            sample_rate,
            state: ModeState::Normal,
            params: EffectParameters::new(sample_rate),
            reverb_edit: ReverbEditCaptures::default(),
            tempo: TempoCaptures::default(),
            tap: TapTempoEngine::new(sample_rate),
            undo: [None; 2],
            pending_clear: None,
        };
        controller.load_settings(record);
        controller
    }

    /// Replaces every persisted parameter with `record` and returns to
    /// Normal, dropping all captures.
    pub fn load_settings(&mut self, record: &PersistedSettings) {
        let p = &mut self.params;
        p.reverb = record.reverb_params().sanitized();
        p.mono_stereo = record.mono_stereo();
        p.makeup_gain = record.makeup();
        p.bypass = record.bypass();
        self.reverb_edit.release();
        self.tempo = TempoCaptures::default();
        self.tap.end();
        self.undo = [None; 2];
        self.pending_clear = None;
        self.state = ModeState::Normal;
    }

    /// Current mode.
    pub fn mode(&self) -> PedalMode {
        self.state.mode()
    }

    /// Parameters for the pipeline.
    pub fn params(&self) -> &EffectParameters {
        &self.params
    }

    /// Tap tempo session state.
    pub fn tap_tempo(&self) -> &TapTempoEngine {
        &self.tap
    }

    /// Sample rate the delay times are computed for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Handles one classified gesture.
    pub fn on_event(
        &mut self,
        event: FootswitchEvent,
        controls: &ControlSnapshot,
        store: &mut SettingsStore,
        now_ms: u32,
    ) -> Option<PipelineCommand> {
        #[cfg(feature = "tracing")]
        tracing::debug!(mode = ?self.mode(), ?event, "footswitch");

        let undo = self.undo[event.footswitch.index()].take();
        match (self.state, event.footswitch, event.gesture) {
            (ModeState::Normal, fs, Gesture::NormalPress) => self.toggle_bypass(fs, event.pressed_at_ms, store),
            (ModeState::Normal, Footswitch::Fs1, Gesture::DoublePress) => {
                self.pending_clear = None;
                let command = undo.and_then(|previous| self.restore_flag(Footswitch::Fs1, previous, store));
                self.enter_tap_tempo(controls, now_ms);
                return command;
            }
            (ModeState::Normal, Footswitch::Fs2, Gesture::DoublePress) => {
                if let Some(previous) = undo {
                    self.restore_flag(Footswitch::Fs2, previous, store);
                }
                self.params.bypass.tremolo = !self.params.bypass.tremolo;
                store.commit_bypass(self.params.bypass);
            }
            (ModeState::Normal, Footswitch::Fs1, Gesture::LongPress) => self.enter_edit_reverb(controls, now_ms),
            (ModeState::Normal, Footswitch::Fs2, Gesture::LongPress) => self.enter_edit_mono_stereo(now_ms),

            (ModeState::EditReverb { .. }, fs, Gesture::NormalPress) => {
                if fs == Footswitch::Fs2 {
                    store.commit_reverb(&self.params.reverb);
                }
                self.params.reverb = store.record().reverb_params();
                store.commit_bypass(self.params.bypass);
                self.reverb_edit.release();
                self.set_state(ModeState::Normal);
            }
            (ModeState::EditMonoStereo { entry_bypass, .. }, fs, Gesture::NormalPress) => {
                if fs == Footswitch::Fs2 {
                    store.commit_routing(self.params.mono_stereo, self.params.makeup_gain);
                } else {
                    self.params.mono_stereo = store.record().mono_stereo();
                    self.params.makeup_gain = store.record().makeup();
                }
                // The record never saw the forced bypass, so there is nothing to commit.
                self.params.bypass = entry_bypass;
                self.set_state(ModeState::Normal);
            }

            (ModeState::TapTempo, Footswitch::Fs1, Gesture::NormalPress) => self.exit_tap_tempo(),
            (ModeState::TapTempo, Footswitch::Fs2, Gesture::NormalPress | Gesture::DoublePress) => {
                self.register_tap(event.pressed_at_ms, controls);
            }

            _ => {}
        }
        None
    }

    /// Maps the controls onto the parameters for the active mode.
    ///
    /// Returns [`PipelineCommand::ClearReverb`] once an FS1 press that
    /// switched the reverb off is past the double-press window and released.
    pub fn refresh(&mut self, controls: &ControlSnapshot, now_ms: u32) -> Option<PipelineCommand> {
        if matches!(self.state, ModeState::TapTempo) && self.tap.timed_out(now_ms) {
            self.exit_tap_tempo();
        }

        let c = controls;
        match self.state {
            ModeState::Normal => {
                self.refresh_knobs(c);
                self.params.reverb_mix = c.toggles[0].select(&REVERB_MIX_TABLE);
                self.params.tremolo_mode = c.toggles[1].select(&TREMOLO_MODE_TABLE);
            }
            ModeState::EditReverb { .. } => {
                self.reverb_edit.refresh(&mut self.params, c);
                self.params.reverb_mix = ReverbMix::AllDry;
            }
            ModeState::EditMonoStereo { .. } => {
                self.refresh_knobs(c);
                self.params.reverb_mix = c.toggles[0].select(&REVERB_MIX_TABLE);
                self.params.makeup_gain = c.toggles[1].select(&MAKEUP_TABLE);
                self.params.mono_stereo = c.toggles[2].select(&MONO_STEREO_TABLE);
            }
            ModeState::TapTempo => {
                self.refresh_knobs(c);
                self.params.delay_subdivision =
                    self.tempo.subdivision.process(c.toggles[0], |p| p.select(&SUBDIVISION_TABLE));
                self.params.tremolo_mode = c.toggles[1].select(&TREMOLO_MODE_TABLE);
            }
        }
        self.params.reverb_type = ReverbType::from_dip(c.dips[0], c.dips[1]);
        self.deferred_clear(c, now_ms)
    }

    /// LED pattern for the active mode.
    pub fn leds(&self, now_ms: u32, tremolo_envelope: f32) -> LedFrame {
        let on = |lit: bool| if lit { 1.0 } else { 0.0 };
        let blink = |entered_ms: u32| (now_ms.wrapping_sub(entered_ms) / EDIT_BLINK_MS) % 2 == 0;
        match self.state {
            ModeState::Normal => {
                let b = self.params.bypass;
                let right = match (!b.delay, !b.tremolo) {
                    (false, false) => 0.0,
                    (true, false) => 1.0,
                    (false, true) => tremolo_envelope * TREMOLO_ONLY_LED_SCALE,
                    (true, true) => tremolo_envelope,
                };
                LedFrame {
                    left: on(!b.reverb),
                    right,
                }
            }
            ModeState::EditReverb { entered_ms } => {
                let lit = on(blink(entered_ms));
                LedFrame { left: lit, right: lit }
            }
            ModeState::EditMonoStereo { entered_ms, .. } => {
                let phase = blink(entered_ms);
                LedFrame {
                    left: on(phase),
                    right: on(!phase),
                }
            }
            ModeState::TapTempo => {
                let right = match (self.tap.interval_ms(), self.tap.last_tap_ms()) {
                    (Some(beat), Some(last)) => on(now_ms.wrapping_sub(last) % beat < beat / 5),
                    _ => 1.0,
                };
                LedFrame {
                    left: TAP_LEFT_LED,
                    right,
                }
            }
        }
    }

    fn refresh_knobs(&mut self, c: &ControlSnapshot) {
        let sample_rate = self.sample_rate;
        let p = &mut self.params;
        p.reverb_wet = c.knobs[0];
        p.tremolo_speed_hz = self
            .tempo
            .tremolo_speed
            .process(c.knobs[1], |k| lerp(MIN_TREMOLO_HZ, MAX_TREMOLO_HZ, k));
        p.tremolo_depth = c.knobs[2];
        p.delay_time_samples = self.tempo.delay_time.process(c.knobs[3], |k| {
            log_scale(k, MIN_DELAY_SECONDS, MAX_DELAY_SECONDS) * sample_rate
        });
        p.delay_feedback = c.knobs[4];
        p.delay_mix_percent = c.knobs[5] * 100.0;
    }

    fn flag_mut(&mut self, fs: Footswitch) -> &mut bool {
        match fs {
            Footswitch::Fs1 => &mut self.params.bypass.reverb,
            Footswitch::Fs2 => &mut self.params.bypass.delay,
        }
    }

    fn toggle_bypass(&mut self, fs: Footswitch, pressed_at_ms: u32, store: &mut SettingsStore) {
        let flag = self.flag_mut(fs);
        let previous = *flag;
        *flag = !previous;
        self.undo[fs.index()] = Some(previous);
        store.commit_bypass(self.params.bypass);
        if fs == Footswitch::Fs1 {
            self.pending_clear = self.params.bypass.reverb.then_some(pressed_at_ms);
        }
    }

    fn restore_flag(&mut self, fs: Footswitch, previous: bool, store: &mut SettingsStore) -> Option<PipelineCommand> {
        *self.flag_mut(fs) = previous;
        store.commit_bypass(self.params.bypass);
        self.reverb_switched_off(fs)
    }

    fn reverb_switched_off(&self, fs: Footswitch) -> Option<PipelineCommand> {
        (fs == Footswitch::Fs1 && self.params.bypass.reverb).then_some(PipelineCommand::ClearReverb)
    }

    fn deferred_clear(&mut self, c: &ControlSnapshot, now_ms: u32) -> Option<PipelineCommand> {
        let pressed_at = self.pending_clear?;
        if !self.params.bypass.reverb {
            self.pending_clear = None;
            return None;
        }
        let window_open = now_ms.wrapping_sub(pressed_at) <= DOUBLE_PRESS_WINDOW_MS;
        if window_open || c.footswitches[Footswitch::Fs1.index()] {
            return None;
        }
        self.pending_clear = None;
        Some(PipelineCommand::ClearReverb)
    }

    fn enter_edit_reverb(&mut self, c: &ControlSnapshot, now_ms: u32) {
        self.params.bypass.reverb = false;
        self.reverb_edit.capture(&self.params, c);
        self.set_state(ModeState::EditReverb { entered_ms: now_ms });
    }

    fn enter_edit_mono_stereo(&mut self, now_ms: u32) {
        let entry_bypass = self.params.bypass;
        self.params.bypass = BypassState {
            reverb: false,
            delay: true,
            tremolo: true,
        };
        self.set_state(ModeState::EditMonoStereo {
            entered_ms: now_ms,
            entry_bypass,
        });
    }

    fn enter_tap_tempo(&mut self, c: &ControlSnapshot, now_ms: u32) {
        let b = self.params.bypass;
        let targets = TapTargets {
            delay: !b.delay,
            tremolo: !b.tremolo,
        };
        self.tap.begin(targets, now_ms);
        if targets.delay {
            self.tempo.delay_time.capture(self.params.delay_time_samples, c.knobs[3]);
        }
        if targets.tremolo {
            self.tempo.tremolo_speed.capture(self.params.tremolo_speed_hz, c.knobs[1]);
        }
        self.tempo.subdivision.capture(self.params.delay_subdivision, c.toggles[0]);
        self.set_state(ModeState::TapTempo);
    }

    fn register_tap(&mut self, at_ms: u32, c: &ControlSnapshot) {
        if !matches!(self.tap.tap(at_ms), TapResult::Accepted { .. }) {
            return;
        }
        let targets = self.tap.targets();
        if targets.delay
            && let Some(samples) = self.tap.delay_time_samples()
        {
            self.params.delay_time_samples = samples;
            self.tempo.delay_time.capture(samples, c.knobs[3]);
        }
        if targets.tremolo
            && let Some(hz) = self.tap.tremolo_hz()
        {
            self.params.tremolo_speed_hz = hz;
            self.tempo.tremolo_speed.capture(hz, c.knobs[1]);
        }
    }

    fn exit_tap_tempo(&mut self) {
        self.tap.end();
        self.tempo.subdivision.release();
        self.set_state(ModeState::Normal);
    }

    fn set_state(&mut self, next: ModeState) {
        #[cfg(feature = "tracing")]
        tracing::info!(from = ?self.state.mode(), to = ?next.mode(), "mode change");
        self.state = next;
    }
}
