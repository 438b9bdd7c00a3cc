//! One block's worth of control readings.

use crate::{ControlId, PlatformController, TogglePosition};

/// Every input control, read once at the top of an audio block.
///
/// Controls the platform does not report read as zero, released or off.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlSnapshot {
    /// Knob readings, 0..1.
    pub knobs: [f32; ControlId::KNOB_COUNT],
    /// Toggle positions.
    pub toggles: [TogglePosition; ControlId::TOGGLE_COUNT],
    /// Footswitch pressed flags.
    pub footswitches: [bool; 2],
    /// DIP switch flags.
    pub dips: [bool; 2],
}

impl ControlSnapshot {
    /// Reads every input from `hw`.
    pub fn read<H: PlatformController + ?Sized>(hw: &H) -> Self {
        let value = |id| hw.read_control(id).map(|s| s.value);
        let on = |id| hw.read_control(id).is_some_and(|s| s.is_on());
        Self {
            knobs: core::array::from_fn(|i| value(ControlId::knob(i as u8)).map_or(0.0, |v| v.clamp(0.0, 1.0))),
            toggles: core::array::from_fn(|i| {
                value(ControlId::toggle(i as u8)).map_or(TogglePosition::default(), TogglePosition::from_normalized)
            }),
            footswitches: [on(ControlId::FOOTSWITCH_1), on(ControlId::FOOTSWITCH_2)],
            dips: [on(ControlId::DIP_1), on(ControlId::DIP_2)],
        }
    }

    /// True while both footswitches are held.
    pub fn both_footswitches(&self) -> bool {
        self.footswitches[0] && self.footswitches[1]
    }
}
