//! Software stand-in for the pedal hardware.
//!
//! [`SimPlatform`] holds settable knob, toggle, footswitch and DIP states, a
//! virtual clock, and a history of every LED frame pushed with
//! [`PlatformController::flush`]. `delay_ms` advances the clock instead of
//! sleeping, so the control loop's blocking pauses cost nothing in tests.

use crate::gesture::Footswitch;
use crate::{ControlId, ControlState, PlatformController, TogglePosition, namespace};

/// Simulated pedal hardware.
#[derive(Debug, Clone, Default)]
pub struct SimPlatform {
    knobs: [f32; ControlId::KNOB_COUNT],
    toggles: [TogglePosition; ControlId::TOGGLE_COUNT],
    footswitches: [bool; 2],
    dips: [bool; 2],
    leds: [f32; 2],
    led_history: Vec<[f32; 2]>,
    elapsed_us: u64,
    bootloader_requested: bool,
}

impl SimPlatform {
    /// All knobs at zero, toggles in the middle, switches released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets knob `index` (0-based), clamped to 0..1.
    pub fn set_knob(&mut self, index: usize, value: f32) {
        if let Some(knob) = self.knobs.get_mut(index) {
            *knob = value.clamp(0.0, 1.0);
        }
    }

    /// Sets every knob at once.
    pub fn set_knobs(&mut self, values: [f32; ControlId::KNOB_COUNT]) {
        for (index, value) in values.into_iter().enumerate() {
            self.set_knob(index, value);
        }
    }

    /// Sets toggle `index` (0-based).
    pub fn set_toggle(&mut self, index: usize, position: TogglePosition) {
        if let Some(toggle) = self.toggles.get_mut(index) {
            *toggle = position;
        }
    }

    /// Presses or releases a footswitch.
    pub fn set_footswitch(&mut self, footswitch: Footswitch, pressed: bool) {
        self.footswitches[footswitch.index()] = pressed;
    }

    /// Sets both DIP switches.
    pub fn set_dips(&mut self, dip1: bool, dip2: bool) {
        self.dips = [dip1, dip2];
    }

    /// Advances the clock.
    pub fn advance_us(&mut self, us: u64) {
        self.elapsed_us += us;
    }

    /// Current `(left, right)` LED intensities.
    pub fn leds(&self) -> (f32, f32) {
        (self.leds[0], self.leds[1])
    }

    /// Every LED frame flushed so far.
    pub fn led_history(&self) -> &[[f32; 2]] {
        &self.led_history
    }

    /// True once [`PlatformController::reset_to_bootloader`] was called.
    pub fn bootloader_requested(&self) -> bool {
        self.bootloader_requested
    }
}

impl PlatformController for SimPlatform {
    fn read_control(&self, id: ControlId) -> Option<ControlState> {
        let index = id.index() as usize;
        let switch = |on: bool| if on { 1.0 } else { 0.0 };
        let value = match id.namespace() {
            namespace::KNOB => *self.knobs.get(index)?,
            namespace::TOGGLE => self.toggles.get(index)?.to_normalized(),
            namespace::FOOTSWITCH => switch(*self.footswitches.get(index)?),
            namespace::DIP => switch(*self.dips.get(index)?),
            namespace::LED => *self.leds.get(index)?,
            _ => return None,
        };
        Some(ControlState::new(value))
    }

    fn write_control(&mut self, id: ControlId, value: f32) -> bool {
        if id.namespace() != namespace::LED {
            return false;
        }
        match self.leds.get_mut(id.index() as usize) {
            Some(led) => {
                *led = value.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    fn flush(&mut self) {
        self.led_history.push(self.leds);
    }

    fn now_ms(&self) -> u32 {
        (self.elapsed_us / 1000) as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_us(u64::from(ms) * 1000);
    }

    fn reset_to_bootloader(&mut self) {
        self.bootloader_requested = true;
    }
}
