//! Flick Platform - control surface of the flick pedal
//!
//! This crate turns debounced switch states and normalized knob readings into
//! [`EffectParameters`](flick_effects::EffectParameters) for the audio
//! pipeline, and drives the two status LEDs.
//!
//! # Core Abstractions
//!
//! ## Hardware contract
//!
//! - [`ControlId`] - Identifier of a physical control (knob, toggle, footswitch, DIP, LED)
//! - [`ControlType`] - Kind of physical control
//! - [`ControlState`] - Current control state with change flag
//! - [`TogglePosition`] - Decoded three-way toggle
//! - [`PlatformController`] - Trait the hardware (or [`SimPlatform`]) implements
//!
//! ## Control logic
//!
//! - [`SoftTakeover`] - Freezes a parameter until its control is moved
//! - [`FootswitchGestures`] - Normal, double and long press classification
//! - [`TapTempoEngine`] - Tempo from footswitch taps
//! - [`ModeController`] - The pedal-mode state machine
//! - [`PedalContext`] - Owns everything; runs the audio callback and the control loop
//!
//! # no_std Support
//!
//! Everything except [`SimPlatform`] works without `std`:
//!
//! ```toml
//! [dependencies]
//! flick-platform = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use flick_config::MemoryStorage;
//! use flick_platform::{PedalContext, SimPlatform};
//!
//! let mut pedal = PedalContext::boot(SimPlatform::new(), MemoryStorage::new(), 48_000.0);
//!
//! let input = [0.0f32; 8];
//! let (mut out_l, mut out_r) = ([0.0f32; 8], [0.0f32; 8]);
//! pedal.audio_callback(&input, &input, &mut out_l, &mut out_r);
//! pedal.control_tick().unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod context;
pub mod dfu;
pub mod factory_reset;
pub mod gesture;
pub mod mode;
#[cfg(feature = "std")]
pub mod sim;
pub mod snapshot;
pub mod soft_takeover;
pub mod tap_tempo;

pub use context::{CONTROL_TICK_MS, ControlStatus, PedalContext};
pub use dfu::{DFU_FLASH_COUNT, DFU_FLASH_MS, DFU_HOLD_MS, DfuHold};
pub use factory_reset::{FactoryReset, ResetStep};
pub use gesture::{
    DOUBLE_PRESS_WINDOW_MS, Footswitch, FootswitchEvent, FootswitchGestures, Gesture, GestureClassifier,
    LONG_PRESS_MS,
};
pub use mode::{LedFrame, ModeController, PedalMode, PipelineCommand};
#[cfg(feature = "std")]
pub use sim::SimPlatform;
pub use snapshot::ControlSnapshot;
pub use soft_takeover::{
    AnyChange, KnobTakeover, MovementPredicate, SoftTakeover, SwitchTakeover, TAKEOVER_THRESHOLD, Threshold,
};
pub use tap_tempo::{TapResult, TapTargets, TapTempoEngine};

/// Namespace identifiers for control sources.
pub mod namespace {
    /// Analog knobs.
    pub const KNOB: u16 = 0x0000;
    /// Three-way toggle switches.
    pub const TOGGLE: u16 = 0x0100;
    /// Momentary footswitches.
    pub const FOOTSWITCH: u16 = 0x0200;
    /// Two-position DIP switches.
    pub const DIP: u16 = 0x0300;
    /// Status LEDs.
    pub const LED: u16 = 0x0400;
}

/// A namespaced control identifier.
///
/// The high byte is the control kind, the low byte the zero-based position on
/// the enclosure.
///
/// # Example
///
/// ```rust
/// use flick_platform::{ControlId, ControlType};
///
/// let knob = ControlId::knob(3);
/// assert_eq!(knob.raw(), 0x0003);
/// assert_eq!(knob.control_type(), Some(ControlType::Knob));
///
/// assert_eq!(ControlId::LED_RIGHT.raw(), 0x0401);
/// assert!(ControlId::LED_RIGHT.control_type().is_some_and(|t| t.is_output()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(u16);

impl ControlId {
    /// First knob (Normal: reverb wet).
    pub const KNOB_1: Self = Self::knob(0);
    /// Second knob.
    pub const KNOB_2: Self = Self::knob(1);
    /// Third knob.
    pub const KNOB_3: Self = Self::knob(2);
    /// Fourth knob.
    pub const KNOB_4: Self = Self::knob(3);
    /// Fifth knob.
    pub const KNOB_5: Self = Self::knob(4);
    /// Sixth knob.
    pub const KNOB_6: Self = Self::knob(5);
    /// First toggle.
    pub const TOGGLE_1: Self = Self::toggle(0);
    /// Second toggle.
    pub const TOGGLE_2: Self = Self::toggle(1);
    /// Third toggle.
    pub const TOGGLE_3: Self = Self::toggle(2);
    /// Left footswitch.
    pub const FOOTSWITCH_1: Self = Self::footswitch(0);
    /// Right footswitch.
    pub const FOOTSWITCH_2: Self = Self::footswitch(1);
    /// First DIP switch.
    pub const DIP_1: Self = Self::dip(0);
    /// Second DIP switch.
    pub const DIP_2: Self = Self::dip(1);
    /// Left LED.
    pub const LED_LEFT: Self = Self::led(0);
    /// Right LED.
    pub const LED_RIGHT: Self = Self::led(1);

    /// Number of knobs on the enclosure.
    pub const KNOB_COUNT: usize = 6;
    /// Number of three-way toggles on the enclosure.
    pub const TOGGLE_COUNT: usize = 3;

    /// Creates a ControlId from a raw 16-bit value.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Knob at `index`.
    #[inline]
    pub const fn knob(index: u8) -> Self {
        Self(namespace::KNOB | index as u16)
    }

    /// Toggle at `index`.
    #[inline]
    pub const fn toggle(index: u8) -> Self {
        Self(namespace::TOGGLE | index as u16)
    }

    /// Footswitch at `index`.
    #[inline]
    pub const fn footswitch(index: u8) -> Self {
        Self(namespace::FOOTSWITCH | index as u16)
    }

    /// DIP switch at `index`.
    #[inline]
    pub const fn dip(index: u8) -> Self {
        Self(namespace::DIP | index as u16)
    }

    /// LED at `index`.
    #[inline]
    pub const fn led(index: u8) -> Self {
        Self(namespace::LED | index as u16)
    }

    /// Returns the raw 16-bit value.
    #[inline]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Returns the namespace portion (high byte).
    #[inline]
    pub const fn namespace(&self) -> u16 {
        self.0 & 0xFF00
    }

    /// Returns the index within the namespace (low byte).
    #[inline]
    pub const fn index(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Kind of control this identifier names, or `None` for an unknown
    /// namespace.
    pub const fn control_type(&self) -> Option<ControlType> {
        match self.namespace() {
            namespace::KNOB => Some(ControlType::Knob),
            namespace::TOGGLE => Some(ControlType::Toggle3Way),
            namespace::FOOTSWITCH => Some(ControlType::Footswitch),
            namespace::DIP => Some(ControlType::DipSwitch),
            namespace::LED => Some(ControlType::Led),
            _ => None,
        }
    }
}

/// Physical control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    /// Rotary knob with continuous value (0.0 to 1.0).
    Knob,
    /// Three-way toggle switch (0.0 = down/left, 0.5 = middle, 1.0 = up/right).
    Toggle3Way,
    /// Momentary footswitch (pressed = 1.0, released = 0.0).
    Footswitch,
    /// Two-position DIP switch (on = 1.0).
    DipSwitch,
    /// LED indicator (0.0 = off, 1.0 = on, intermediate for brightness).
    Led,
}

impl ControlType {
    /// Returns the number of discrete positions for this control type.
    ///
    /// Returns `None` for continuous controls (Knob, Led).
    ///
    /// ```rust
    /// use flick_platform::ControlType;
    ///
    /// assert_eq!(ControlType::Toggle3Way.discrete_positions(), Some(3));
    /// assert_eq!(ControlType::DipSwitch.discrete_positions(), Some(2));
    /// assert_eq!(ControlType::Knob.discrete_positions(), None);
    /// ```
    #[inline]
    pub const fn discrete_positions(&self) -> Option<u8> {
        match self {
            ControlType::Knob | ControlType::Led => None,
            ControlType::Toggle3Way => Some(3),
            ControlType::Footswitch | ControlType::DipSwitch => Some(2),
        }
    }

    /// Returns true if this is an output control (LED).
    #[inline]
    pub const fn is_output(&self) -> bool {
        matches!(self, ControlType::Led)
    }

    /// Returns true if this is an input control.
    #[inline]
    pub const fn is_input(&self) -> bool {
        !self.is_output()
    }
}

/// Decoded position of a three-way toggle.
///
/// Lookup tables driven by a toggle are indexed `[Up, Middle, Down]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TogglePosition {
    /// Up (or right).
    Up,
    /// Middle.
    #[default]
    Middle,
    /// Down (or left).
    Down,
}

impl TogglePosition {
    /// Decodes a normalized toggle reading.
    ///
    /// ```rust
    /// use flick_platform::TogglePosition;
    ///
    /// assert_eq!(TogglePosition::from_normalized(1.0), TogglePosition::Up);
    /// assert_eq!(TogglePosition::from_normalized(0.5), TogglePosition::Middle);
    /// assert_eq!(TogglePosition::from_normalized(0.0), TogglePosition::Down);
    /// ```
    pub fn from_normalized(value: f32) -> Self {
        if value >= 0.75 {
            Self::Up
        } else if value <= 0.25 {
            Self::Down
        } else {
            Self::Middle
        }
    }

    /// Normalized reading for this position.
    pub const fn to_normalized(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Middle => 0.5,
            Self::Down => 0.0,
        }
    }

    /// Table index: Up 0, Middle 1, Down 2.
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Middle => 1,
            Self::Down => 2,
        }
    }

    /// Picks this position's entry from an `[Up, Middle, Down]` table.
    pub fn select<T: Copy>(self, table: &[T; 3]) -> T {
        table[self.index()]
    }
}

/// Current state of a control.
///
/// All values are normalized to 0.0..=1.0; see [`ControlType`] for what the
/// range means per kind.
///
/// ```rust
/// use flick_platform::ControlState;
///
/// let state = ControlState::new(0.75);
/// assert_eq!(state.value, 0.75);
/// assert!(!state.changed);
/// assert!(ControlState::changed(0.5).changed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// Normalized control value (0.0 to 1.0).
    pub value: f32,
    /// True if the value has changed since last read.
    pub changed: bool,
}

impl ControlState {
    /// Creates a new control state with the given value (not marked as changed).
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self { value, changed: false }
    }

    /// Creates a control state marked as changed.
    #[inline]
    pub const fn changed(value: f32) -> Self {
        Self { value, changed: true }
    }

    /// Clears the changed flag.
    #[inline]
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Sets a new value and marks the state as changed if different.
    ///
    /// Uses a small epsilon to avoid marking as changed due to floating point noise.
    #[inline]
    pub fn set(&mut self, value: f32) {
        const EPSILON: f32 = 1e-6;
        if libm::fabsf(self.value - value) > EPSILON {
            self.value = value;
            self.changed = true;
        }
    }

    /// True when the value reads as an active switch.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.value >= 0.5
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Hardware-facing control layer.
///
/// Knob readings arrive normalized and filtered, switches debounced. The pedal
/// core never touches pins or ADCs directly.
///
/// # Example
///
/// ```rust
/// use flick_platform::{ControlId, ControlState, PlatformController};
///
/// struct Bench {
///     knobs: [f32; 6],
///     leds: [f32; 2],
///     now: u32,
/// }
///
/// impl PlatformController for Bench {
///     fn read_control(&self, id: ControlId) -> Option<ControlState> {
///         match id.namespace() {
///             flick_platform::namespace::KNOB => self.knobs.get(id.index() as usize).copied().map(ControlState::new),
///             _ => None,
///         }
///     }
///
///     fn write_control(&mut self, id: ControlId, value: f32) -> bool {
///         match self.leds.get_mut(id.index() as usize) {
///             Some(led) if id.namespace() == flick_platform::namespace::LED => {
///                 *led = value;
///                 true
///             }
///             _ => false,
///         }
///     }
///
///     fn now_ms(&self) -> u32 {
///         self.now
///     }
///
///     fn delay_ms(&mut self, ms: u32) {
///         self.now += ms;
///     }
///
///     fn reset_to_bootloader(&mut self) {}
/// }
///
/// let mut bench = Bench { knobs: [0.25; 6], leds: [0.0; 2], now: 0 };
/// assert_eq!(bench.read_control(ControlId::KNOB_2).map(|s| s.value), Some(0.25));
/// assert!(bench.write_control(ControlId::LED_LEFT, 1.0));
/// assert!(!bench.write_control(ControlId::KNOB_1, 1.0));
/// ```
pub trait PlatformController {
    /// Returns the type of the specified control.
    ///
    /// Returns `None` if the control ID is not recognized.
    fn control_type(&self, id: ControlId) -> Option<ControlType> {
        id.control_type()
    }

    /// Reads the current state of a control.
    ///
    /// Returns `None` if the control ID is not recognized or is not readable.
    fn read_control(&self, id: ControlId) -> Option<ControlState>;

    /// Writes a value to a control (LEDs).
    ///
    /// Returns `true` if the write was successful, `false` if the control
    /// is not writable or the ID is not recognized.
    fn write_control(&mut self, id: ControlId, value: f32) -> bool;

    /// Updates the controller state by reading from hardware.
    ///
    /// Called at the start of each audio block. Default implementation does
    /// nothing (for controllers with interrupt-driven updates).
    fn poll(&mut self) {}

    /// Pushes pending LED changes to hardware.
    fn flush(&mut self) {}

    /// Monotonic milliseconds since power-up. Wraps after ~49 days.
    fn now_ms(&self) -> u32;

    /// Blocks the control loop for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Reboots into the firmware-update bootloader. On hardware this does
    /// not return.
    fn reset_to_bootloader(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_id_layout() {
        assert_eq!(ControlId::KNOB_6.raw(), 0x0005);
        assert_eq!(ControlId::TOGGLE_1.raw(), 0x0100);
        assert_eq!(ControlId::FOOTSWITCH_2.raw(), 0x0201);
        assert_eq!(ControlId::DIP_2.namespace(), namespace::DIP);
        assert_eq!(ControlId::LED_LEFT.index(), 0);
    }

    #[test]
    fn test_control_id_types() {
        assert_eq!(ControlId::TOGGLE_3.control_type(), Some(ControlType::Toggle3Way));
        assert_eq!(ControlId::FOOTSWITCH_1.control_type(), Some(ControlType::Footswitch));
        assert_eq!(ControlId::DIP_1.control_type(), Some(ControlType::DipSwitch));
        assert_eq!(ControlId::from_raw(0x0900).control_type(), None);
    }

    #[test]
    fn test_control_type_input_output() {
        assert!(ControlType::Knob.is_input());
        assert!(ControlType::DipSwitch.is_input());
        assert!(!ControlType::Led.is_input());
        assert!(ControlType::Led.is_output());
    }

    #[test]
    fn test_toggle_decoding_thresholds() {
        assert_eq!(TogglePosition::from_normalized(0.75), TogglePosition::Up);
        assert_eq!(TogglePosition::from_normalized(0.74), TogglePosition::Middle);
        assert_eq!(TogglePosition::from_normalized(0.26), TogglePosition::Middle);
        assert_eq!(TogglePosition::from_normalized(0.25), TogglePosition::Down);
        for pos in [TogglePosition::Up, TogglePosition::Middle, TogglePosition::Down] {
            assert_eq!(TogglePosition::from_normalized(pos.to_normalized()), pos);
        }
    }

    #[test]
    fn test_toggle_table_order() {
        let table = ['u', 'm', 'd'];
        assert_eq!(TogglePosition::Up.select(&table), 'u');
        assert_eq!(TogglePosition::Middle.select(&table), 'm');
        assert_eq!(TogglePosition::Down.select(&table), 'd');
    }

    #[test]
    fn test_control_state_set() {
        let mut state = ControlState::new(0.0);
        state.set(0.5);
        assert!(state.changed);
        assert!(state.is_on());

        state.clear_changed();
        state.set(0.5);
        assert!(!state.changed);

        state.set(0.1);
        assert!(state.changed);
        assert!(!state.is_on());
    }

    #[test]
    fn test_control_state_default() {
        let state = ControlState::default();
        assert_eq!(state.value, 0.0);
        assert!(!state.changed);
    }
}
