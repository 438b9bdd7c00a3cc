//! The pedal context: the single owner of all pedal state.
//!
//! Two entry points share it:
//!
//! - [`PedalContext::audio_callback`] runs once per audio block. It reads the
//!   controls, classifies footswitch gestures, refreshes the parameters for
//!   the active mode, renders the block and sets the LEDs. It never blocks
//!   or allocates.
//! - [`PedalContext::control_tick`] runs from the slower control loop every
//!   [`CONTROL_TICK_MS`]. It performs storage writes requested by the audio
//!   side, watches for the firmware-update hold and steps the boot-time
//!   factory reset. It may block on deliberate LED pauses.

use flick_config::{ConfigError, LoadOutcome, PersistedSettings, SettingsStorage, SettingsStore};
use flick_effects::Pipeline;

use crate::dfu::{DFU_FLASH_COUNT, DFU_FLASH_MS, DfuHold};
use crate::factory_reset::{FactoryReset, ResetStep, STAGE_FLASH_MS};
use crate::gesture::FootswitchGestures;
use crate::mode::{ModeController, PedalMode, PipelineCommand};
use crate::snapshot::ControlSnapshot;
use crate::{ControlId, PlatformController};

/// Control loop period.
pub const CONTROL_TICK_MS: u32 = 10;

/// What the pedal is doing, as seen by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    /// Processing audio.
    Running,
    /// Waiting on the factory-reset sweeps; audio is muted.
    FactoryReset,
    /// Handed over to the bootloader; audio is muted.
    Bootloader,
}

#[derive(Debug)]
enum Phase {
    Running,
    FactoryReset(FactoryReset),
    Halted,
}

/// Hardware, storage, settings, controller and pipeline in one place.
#[derive(Debug)]
pub struct PedalContext<H, S> {
    hw: H,
    storage: S,
    store: SettingsStore,
    load_outcome: LoadOutcome,
    controller: ModeController,
    pipeline: Pipeline,
    gestures: FootswitchGestures,
    dfu: DfuHold,
    phase: Phase,
}

impl<H: PlatformController, S: SettingsStorage> PedalContext<H, S> {
    /// Loads the settings and builds the pipeline.
    ///
    /// If FS2 is held at this point the pedal starts in the factory-reset
    /// sequence instead of Normal mode.
    pub fn boot(mut hw: H, mut storage: S, sample_rate: f32) -> Self {
        hw.poll();
        let (store, load_outcome) = SettingsStore::load(&mut storage, PersistedSettings::default());
        let controller = ModeController::new(sample_rate, store.record());
        let mut pipeline = Pipeline::new(sample_rate);
        pipeline.update(controller.params());

        let controls = ControlSnapshot::read(&hw);
        let now = hw.now_ms();
        let mut gestures = FootswitchGestures::new();
        gestures.reset(controls.footswitches, now);

        let phase = if controls.footswitches[1] {
            #[cfg(feature = "tracing")]
            tracing::info!("FS2 held at boot, entering factory reset");
            Phase::FactoryReset(FactoryReset::new(now))
        } else {
            Phase::Running
        };

        Self {
            hw,
            storage,
            store,
            load_outcome,
            controller,
            pipeline,
            gestures,
            dfu: DfuHold::new(),
            phase,
        }
    }

    /// Renders one block. All four slices should have the block length.
    pub fn audio_callback(&mut self, in_l: &[f32], in_r: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        if !matches!(self.phase, Phase::Running) {
            out_l.fill(0.0);
            out_r.fill(0.0);
            return;
        }

        self.hw.poll();
        let controls = ControlSnapshot::read(&self.hw);
        let now = self.hw.now_ms();

        for event in self.gestures.update(controls.footswitches, now).into_iter().flatten() {
            let command = self.controller.on_event(event, &controls, &mut self.store, now);
            self.apply(command);
        }
        let command = self.controller.refresh(&controls, now);
        self.apply(command);

        self.pipeline.update(self.controller.params());
        self.pipeline.process_block(in_l, in_r, out_l, out_r);

        let leds = self.controller.leds(now, self.pipeline.tremolo_envelope());
        self.set_leds(leds.left, leds.right);
    }

    /// One control loop iteration.
    ///
    /// A failed storage write is returned after everything else in the
    /// iteration has run; the write is retried on the next call.
    pub fn control_tick(&mut self) -> Result<ControlStatus, ConfigError> {
        if matches!(self.phase, Phase::Halted) {
            return Ok(ControlStatus::Bootloader);
        }

        self.hw.poll();
        let controls = ControlSnapshot::read(&self.hw);
        let now = self.hw.now_ms();

        let status = if matches!(self.phase, Phase::FactoryReset(_)) {
            self.advance_factory_reset(&controls, now)
        } else if self.dfu.update(controls.both_footswitches(), now) {
            let flushed = self.store.flush_if_requested(&mut self.storage);
            self.enter_bootloader();
            return flushed.map(|_| ControlStatus::Bootloader);
        } else {
            ControlStatus::Running
        };

        self.store.flush_if_requested(&mut self.storage)?;
        Ok(status)
    }

    /// Current control loop status.
    pub fn status(&self) -> ControlStatus {
        match self.phase {
            Phase::Running => ControlStatus::Running,
            Phase::FactoryReset(_) => ControlStatus::FactoryReset,
            Phase::Halted => ControlStatus::Bootloader,
        }
    }

    /// Current pedal mode.
    pub fn mode(&self) -> PedalMode {
        self.controller.mode()
    }

    /// How the settings were obtained at boot.
    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// The mode controller.
    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    /// The audio pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The live settings record.
    pub fn settings(&self) -> &SettingsStore {
        &self.store
    }

    /// The hardware.
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// The hardware, for driving a simulator.
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Gives back the hardware and storage.
    pub fn into_parts(self) -> (H, S) {
        (self.hw, self.storage)
    }

    fn apply(&mut self, command: Option<PipelineCommand>) {
        match command {
            Some(PipelineCommand::ClearReverb) => self.pipeline.clear_reverb(),
            None => {}
        }
    }

    fn advance_factory_reset(&mut self, controls: &ControlSnapshot, now: u32) -> ControlStatus {
        let Phase::FactoryReset(reset) = &mut self.phase else {
            return ControlStatus::Running;
        };
        let step = reset.update(controls.knobs[0], controls.footswitches, now);
        let (left, right) = reset.leds();

        match step {
            ResetStep::Waiting => {
                self.set_leds(left, right);
                ControlStatus::FactoryReset
            }
            ResetStep::StageComplete { .. } => {
                self.flash_both(STAGE_FLASH_MS);
                ControlStatus::FactoryReset
            }
            ResetStep::Complete => {
                self.flash_both(STAGE_FLASH_MS);
                self.store.restore_defaults();
                self.controller.load_settings(self.store.record());
                self.pipeline.clear();
                #[cfg(feature = "tracing")]
                tracing::info!("factory reset complete");
                self.resume(controls);
                ControlStatus::Running
            }
            ResetStep::Aborted => {
                #[cfg(feature = "tracing")]
                tracing::info!("factory reset aborted");
                self.resume(controls);
                ControlStatus::Running
            }
        }
    }

    fn resume(&mut self, controls: &ControlSnapshot) {
        self.gestures.reset(controls.footswitches, self.hw.now_ms());
        self.dfu = DfuHold::new();
        self.pipeline.update(self.controller.params());
        self.phase = Phase::Running;
    }

    fn enter_bootloader(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::info!("both footswitches held, entering bootloader");
        self.phase = Phase::Halted;
        for _ in 0..DFU_FLASH_COUNT {
            self.set_leds(1.0, 0.0);
            self.hw.delay_ms(DFU_FLASH_MS);
            self.set_leds(0.0, 1.0);
            self.hw.delay_ms(DFU_FLASH_MS);
        }
        self.hw.reset_to_bootloader();
    }

    fn flash_both(&mut self, ms: u32) {
        self.set_leds(1.0, 1.0);
        self.hw.delay_ms(ms);
    }

    fn set_leds(&mut self, left: f32, right: f32) {
        self.hw.write_control(ControlId::LED_LEFT, left);
        self.hw.write_control(ControlId::LED_RIGHT, right);
        self.hw.flush();
    }
}
