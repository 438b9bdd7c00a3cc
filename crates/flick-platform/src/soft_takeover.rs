//! Soft takeover for controls that change meaning between modes.
//!
//! When a knob or toggle is handed to a different parameter, the parameter
//! keeps its current value (frozen) until the control is moved away from the
//! position it had at hand-over. From then on the control drives the
//! parameter directly until the next [`SoftTakeover::capture`].
//!
//! One type serves both kinds of control; only the [`MovementPredicate`]
//! differs:
//!
//! - [`Threshold`] for knobs: moved once `|raw - baseline| >= threshold`
//! - [`AnyChange`] for switches: moved once the position differs
//!
//! # Example
//!
//! ```rust
//! use flick_platform::KnobTakeover;
//!
//! let mut decay = KnobTakeover::default();
//! decay.capture(0.8, 0.2); // parameter at 0.8, knob sitting at 0.2
//!
//! assert_eq!(decay.process(0.23, |k| k), 0.8); // still frozen
//! assert_eq!(decay.process(0.26, |k| k), 0.26); // moved past 5 %: live
//! assert_eq!(decay.process(0.21, |k| k), 0.21); // never freezes again
//! ```

/// Default knob movement, as a fraction of full travel, needed to take over.
pub const TAKEOVER_THRESHOLD: f32 = 0.05;

/// Decides whether a control has moved away from its captured baseline.
pub trait MovementPredicate<R> {
    /// True once `current` counts as moved relative to `baseline`.
    fn has_moved(&self, baseline: &R, current: &R) -> bool;
}

/// Continuous movement test: at least `self.0` of full travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(pub f32);

impl Default for Threshold {
    fn default() -> Self {
        Self(TAKEOVER_THRESHOLD)
    }
}

impl MovementPredicate<f32> for Threshold {
    #[inline]
    fn has_moved(&self, baseline: &f32, current: &f32) -> bool {
        libm::fabsf(current - baseline) >= self.0
    }
}

/// Discrete movement test: any different position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyChange;

impl<R: PartialEq> MovementPredicate<R> for AnyChange {
    #[inline]
    fn has_moved(&self, baseline: &R, current: &R) -> bool {
        baseline != current
    }
}

/// A captured control.
///
/// `V` is the logical parameter value, `R` the raw control reading.
#[derive(Debug, Clone, Copy)]
pub struct SoftTakeover<V, R, P> {
    frozen_value: V,
    baseline: R,
    frozen: bool,
    predicate: P,
}

/// Knob takeover with the default 5 % threshold.
pub type KnobTakeover<V = f32> = SoftTakeover<V, f32, Threshold>;

/// Toggle takeover released by any position change.
pub type SwitchTakeover<V> = SoftTakeover<V, crate::TogglePosition, AnyChange>;

impl<V: Default, R: Default, P: Default> Default for SoftTakeover<V, R, P> {
    fn default() -> Self {
        Self {
            frozen_value: V::default(),
            baseline: R::default(),
            frozen: false,
            predicate: P::default(),
        }
    }
}

impl<V: Copy, R: Copy, P: MovementPredicate<R>> SoftTakeover<V, R, P> {
    /// A released takeover using `predicate`.
    pub fn with_predicate(initial: V, raw: R, predicate: P) -> Self {
        Self {
            frozen_value: initial,
            baseline: raw,
            frozen: false,
            predicate,
        }
    }

    /// Freezes `value` and records `raw` as the baseline position.
    pub fn capture(&mut self, value: V, raw: R) {
        self.frozen_value = value;
        self.baseline = raw;
        self.frozen = true;
    }

    /// Returns the frozen value until `raw` has moved, then `map(raw)`.
    ///
    /// Once moved, the takeover stays live until the next
    /// [`capture`](Self::capture).
    #[inline]
    pub fn process(&mut self, raw: R, map: impl FnOnce(R) -> V) -> V {
        if self.frozen && !self.predicate.has_moved(&self.baseline, &raw) {
            return self.frozen_value;
        }
        self.frozen = false;
        map(raw)
    }

    /// Back to pass-through without waiting for movement.
    pub fn release(&mut self) {
        self.frozen = false;
    }

    /// True while the frozen value is still in charge.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The last captured value.
    pub fn frozen_value(&self) -> V {
        self.frozen_value
    }

    /// The raw position recorded at capture.
    pub fn baseline(&self) -> R {
        self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TogglePosition;

    #[test]
    fn released_takeover_passes_through() {
        let mut knob = KnobTakeover::default();
        assert!(!knob.is_frozen());
        assert_eq!(knob.process(0.4, |k| k * 10.0), 4.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut knob = SoftTakeover::with_predicate(0.0, 0.0, Threshold(0.25));
        knob.capture(7.0, 0.5);
        assert_eq!(knob.process(0.74, |k| k), 7.0);
        assert!(knob.is_frozen());
        assert_eq!(knob.process(0.75, |k| k), 0.75);
        assert!(!knob.is_frozen());
    }

    #[test]
    fn movement_in_either_direction_counts() {
        let mut knob = KnobTakeover::default();
        knob.capture(0.5, 0.5);
        assert_eq!(knob.process(0.44, |k| k), 0.44);
    }

    #[test]
    fn switch_releases_on_any_new_position() {
        let mut speed: SwitchTakeover<f32> = SwitchTakeover::default();
        speed.capture(0.1, TogglePosition::Down);
        let table = [0.5, 0.25, 0.1];
        assert_eq!(speed.process(TogglePosition::Down, |p| p.select(&table)), 0.1);
        assert_eq!(speed.process(TogglePosition::Middle, |p| p.select(&table)), 0.25);
        assert_eq!(speed.process(TogglePosition::Down, |p| p.select(&table)), 0.1);
        assert!(!speed.is_frozen());
    }

    #[test]
    fn frozen_switch_ignores_matching_table_entry() {
        let mut speed: SwitchTakeover<f32> = SwitchTakeover::default();
        speed.capture(0.33, TogglePosition::Up);
        assert_eq!(speed.process(TogglePosition::Up, |_| 0.5), 0.33);
    }

    #[test]
    fn recapture_refreezes() {
        let mut knob = KnobTakeover::default();
        knob.capture(1.0, 0.0);
        knob.process(0.5, |k| k);
        knob.capture(2.0, 0.5);
        assert!(knob.is_frozen());
        assert_eq!(knob.frozen_value(), 2.0);
        assert_eq!(knob.baseline(), 0.5);
        knob.release();
        assert_eq!(knob.process(0.5, |k| k), 0.5);
    }
}
