//! Boot-time factory reset.
//!
//! Entered by holding FS2 at power-up. The user sweeps knob 1 fully up, down,
//! up and down again; each completed sweep shortens the LED blink interval.
//! A fresh press of either footswitch abandons the reset.

/// LED blink interval before any stage is complete.
pub const INITIAL_BLINK_MS: u32 = 1000;
/// Blink interval reduction per completed stage.
pub const BLINK_STEP_MS: u32 = 300;
/// Both LEDs stay lit this long after a completed stage.
pub const STAGE_FLASH_MS: u32 = 500;

const HIGH: f32 = 0.95;
const LOW: f32 = 0.05;
const STAGES: u8 = 4;

/// What one [`FactoryReset::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    /// Waiting for the knob to reach the next end stop.
    Waiting,
    /// A stage other than the last finished.
    StageComplete {
        /// Stages finished so far.
        completed: u8,
    },
    /// All stages finished; restore the defaults.
    Complete,
    /// A footswitch was pressed; leave settings alone.
    Aborted,
}

/// Factory reset sequence state.
#[derive(Debug, Clone)]
pub struct FactoryReset {
    completed: u8,
    blink_ms: u32,
    last_toggle_ms: u32,
    phase: bool,
    armed: [bool; 2],
}

impl FactoryReset {
    /// Starts the sequence at `now_ms`. Footswitches held now must be
    /// released before they can abort.
    pub fn new(now_ms: u32) -> Self {
        Self {
            completed: 0,
            blink_ms: INITIAL_BLINK_MS,
            last_toggle_ms: now_ms,
            phase: true,
            armed: [false; 2],
        }
    }

    /// Feeds knob 1, the footswitch states and the clock.
    pub fn update(&mut self, knob: f32, footswitches: [bool; 2], now_ms: u32) -> ResetStep {
        for (armed, pressed) in self.armed.iter_mut().zip(footswitches) {
            if !pressed {
                *armed = true;
            } else if *armed {
                return ResetStep::Aborted;
            }
        }

        if now_ms.wrapping_sub(self.last_toggle_ms) >= self.blink_ms {
            self.phase = !self.phase;
            self.last_toggle_ms = now_ms;
        }

        let target_reached = if self.completed % 2 == 0 { knob >= HIGH } else { knob <= LOW };
        if !target_reached {
            return ResetStep::Waiting;
        }

        self.completed += 1;
        #[cfg(feature = "tracing")]
        tracing::info!(stage = self.completed, "factory reset stage complete");
        if self.completed == STAGES {
            return ResetStep::Complete;
        }
        self.blink_ms -= BLINK_STEP_MS;
        ResetStep::StageComplete {
            completed: self.completed,
        }
    }

    /// Alternating LED pattern: `(left, right)`.
    pub fn leds(&self) -> (f32, f32) {
        if self.phase { (1.0, 0.0) } else { (0.0, 1.0) }
    }

    /// Current blink interval.
    pub fn blink_ms(&self) -> u32 {
        self.blink_ms
    }

    /// Stages finished so far.
    pub fn completed(&self) -> u8 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_sweeps_complete_the_reset() {
        let mut reset = FactoryReset::new(0);
        assert_eq!(reset.update(0.5, [false; 2], 10), ResetStep::Waiting);
        assert_eq!(reset.update(0.96, [false; 2], 20), ResetStep::StageComplete { completed: 1 });
        assert_eq!(reset.blink_ms(), 700);
        assert_eq!(reset.update(0.96, [false; 2], 30), ResetStep::Waiting);
        assert_eq!(reset.update(0.04, [false; 2], 40), ResetStep::StageComplete { completed: 2 });
        assert_eq!(reset.update(0.95, [false; 2], 50), ResetStep::StageComplete { completed: 3 });
        assert_eq!(reset.blink_ms(), 100);
        assert_eq!(reset.update(0.05, [false; 2], 60), ResetStep::Complete);
    }

    #[test]
    fn held_boot_switch_does_not_abort() {
        let mut reset = FactoryReset::new(0);
        assert_eq!(reset.update(0.5, [false, true], 10), ResetStep::Waiting);
        assert_eq!(reset.update(0.5, [false, false], 20), ResetStep::Waiting);
        assert_eq!(reset.update(0.5, [false, true], 30), ResetStep::Aborted);
    }

    #[test]
    fn leds_alternate_at_blink_interval() {
        let mut reset = FactoryReset::new(0);
        assert_eq!(reset.leds(), (1.0, 0.0));
        reset.update(0.5, [false; 2], 999);
        assert_eq!(reset.leds(), (1.0, 0.0));
        reset.update(0.5, [false; 2], 1000);
        assert_eq!(reset.leds(), (0.0, 1.0));
    }
}
