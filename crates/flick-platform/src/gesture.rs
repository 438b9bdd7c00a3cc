//! Footswitch gesture classification.
//!
//! Each footswitch is sampled once per audio block. A press-release cycle
//! yields exactly one [`Gesture`]:
//!
//! - [`Gesture::LongPress`] fires while the switch is still held, once the
//!   hold reaches [`LONG_PRESS_MS`]; the release of that press is swallowed.
//! - [`Gesture::DoublePress`] fires on release of a press that started
//!   within [`DOUBLE_PRESS_WINDOW_MS`] of the previous press.
//! - [`Gesture::NormalPress`] fires on release otherwise.
//!
//! The first cycle of a double press has already been reported as a
//! `NormalPress` by the time the second cycle completes.

/// Largest gap between two press starts that still forms a double press.
pub const DOUBLE_PRESS_WINDOW_MS: u32 = 500;

/// Hold duration that makes a long press.
pub const LONG_PRESS_MS: u32 = 2000;

/// Which footswitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Footswitch {
    /// Left footswitch.
    Fs1,
    /// Right footswitch.
    Fs2,
}

impl Footswitch {
    /// Both footswitches in index order.
    pub const ALL: [Self; 2] = [Self::Fs1, Self::Fs2];

    /// Zero-based index.
    pub const fn index(self) -> usize {
        match self {
            Self::Fs1 => 0,
            Self::Fs2 => 1,
        }
    }
}

/// Press classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Single short press.
    NormalPress,
    /// Second press of a quick pair.
    DoublePress,
    /// Press held past the long-press threshold.
    LongPress,
}

/// A classified gesture on one footswitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootswitchEvent {
    /// Footswitch the gesture happened on.
    pub footswitch: Footswitch,
    /// What kind of gesture.
    pub gesture: Gesture,
    /// Clock reading at the start of the press.
    pub pressed_at_ms: u32,
}

/// Edge and timing state for one footswitch.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureClassifier {
    was_pressed: bool,
    press_start_ms: u32,
    last_press_ms: Option<u32>,
    press_count: u8,
    long_fired: bool,
}

impl GestureClassifier {
    /// Classifier that has seen the switch released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arms the classifier for a switch that currently reads `pressed`.
    ///
    /// A press already in progress is never classified.
    pub fn reset(&mut self, pressed: bool, now_ms: u32) {
        *self = Self {
            was_pressed: pressed,
            press_start_ms: now_ms,
            last_press_ms: None,
            press_count: 0,
            long_fired: pressed,
        };
    }

    /// Feeds one debounced sample.
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<Gesture> {
        let rising = pressed && !self.was_pressed;
        let falling = !pressed && self.was_pressed;
        self.was_pressed = pressed;

        if rising {
            self.press_start_ms = now_ms;
            let quick = self
                .last_press_ms
                .is_some_and(|last| now_ms.wrapping_sub(last) <= DOUBLE_PRESS_WINDOW_MS);
            self.press_count = if quick { self.press_count.saturating_add(1) } else { 1 };
            self.last_press_ms = Some(now_ms);
            self.long_fired = false;
        }

        let held_ms = now_ms.wrapping_sub(self.press_start_ms);

        if pressed && !self.long_fired && held_ms >= LONG_PRESS_MS {
            self.long_fired = true;
            self.press_count = 0;
            return Some(Gesture::LongPress);
        }

        if falling && !self.long_fired {
            if self.press_count >= 2 {
                self.press_count = 0;
                return Some(Gesture::DoublePress);
            }
            // A release seen only after the threshold still counts as one
            // classification.
            return Some(if held_ms < LONG_PRESS_MS {
                Gesture::NormalPress
            } else {
                Gesture::LongPress
            });
        }

        None
    }

    /// Clock reading at the start of the current or last press.
    pub fn press_start_ms(&self) -> u32 {
        self.press_start_ms
    }

    /// True while the switch is down.
    pub fn is_held(&self) -> bool {
        self.was_pressed
    }
}

/// Classifiers for both footswitches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FootswitchGestures {
    classifiers: [GestureClassifier; 2],
}

impl FootswitchGestures {
    /// Both classifiers released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arms both classifiers against the current switch states.
    pub fn reset(&mut self, pressed: [bool; 2], now_ms: u32) {
        for (classifier, pressed) in self.classifiers.iter_mut().zip(pressed) {
            classifier.reset(pressed, now_ms);
        }
    }

    /// Feeds one block's switch states. At most one event per footswitch.
    pub fn update(&mut self, pressed: [bool; 2], now_ms: u32) -> [Option<FootswitchEvent>; 2] {
        Footswitch::ALL.map(|footswitch| {
            let classifier = &mut self.classifiers[footswitch.index()];
            classifier
                .update(pressed[footswitch.index()], now_ms)
                .map(|gesture| FootswitchEvent {
                    footswitch,
                    gesture,
                    pressed_at_ms: classifier.press_start_ms(),
                })
        })
    }

    /// Classifier for one footswitch.
    pub fn classifier(&self, footswitch: Footswitch) -> &GestureClassifier {
        &self.classifiers[footswitch.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives `c` with a press lasting `hold` ms starting at `start`,
    /// sampling every millisecond, and collects the gestures.
    fn press(c: &mut GestureClassifier, start: u32, hold: u32) -> Vec<Gesture> {
        let mut out = Vec::new();
        for t in start..start + hold {
            out.extend(c.update(true, t));
        }
        out.extend(c.update(false, start + hold));
        out
    }

    #[test]
    fn short_press_is_normal() {
        let mut c = GestureClassifier::new();
        assert_eq!(press(&mut c, 1000, 80), [Gesture::NormalPress]);
    }

    #[test]
    fn quick_second_press_is_double() {
        let mut c = GestureClassifier::new();
        assert_eq!(press(&mut c, 1000, 80), [Gesture::NormalPress]);
        assert_eq!(press(&mut c, 1400, 80), [Gesture::DoublePress]);
        assert_eq!(press(&mut c, 1800, 80), [Gesture::NormalPress]);
    }

    #[test]
    fn double_window_is_measured_between_press_starts() {
        let mut c = GestureClassifier::new();
        press(&mut c, 1000, 450);
        assert_eq!(press(&mut c, 1500, 50), [Gesture::DoublePress]);

        let mut c = GestureClassifier::new();
        press(&mut c, 1000, 50);
        assert_eq!(press(&mut c, 1501, 50), [Gesture::NormalPress]);
    }

    #[test]
    fn long_press_fires_once_while_held() {
        let mut c = GestureClassifier::new();
        let mut fired_at = None;
        for t in 0..3000 {
            if c.update(true, 100 + t) == Some(Gesture::LongPress) {
                assert!(fired_at.is_none());
                fired_at = Some(t);
            }
        }
        assert_eq!(fired_at, Some(LONG_PRESS_MS));
        assert_eq!(c.update(false, 3100), None);
    }

    #[test]
    fn release_after_threshold_between_samples_is_long() {
        let mut c = GestureClassifier::new();
        assert_eq!(c.update(true, 0), None);
        assert_eq!(c.update(false, 2500), Some(Gesture::LongPress));
    }

    #[test]
    fn reset_swallows_press_in_progress() {
        let mut c = GestureClassifier::new();
        c.reset(true, 0);
        assert_eq!(c.update(true, 2500), None);
        assert_eq!(c.update(false, 2600), None);
        assert_eq!(press(&mut c, 3000, 50), [Gesture::NormalPress]);
    }

    #[test]
    fn events_carry_press_start() {
        let mut g = FootswitchGestures::new();
        assert_eq!(g.update([false, true], 40), [None, None]);
        let events = g.update([false, false], 90);
        assert_eq!(
            events[1],
            Some(FootswitchEvent {
                footswitch: Footswitch::Fs2,
                gesture: Gesture::NormalPress,
                pressed_at_ms: 40,
            })
        );
        assert!(events[0].is_none());
    }

    #[test]
    fn clock_wrap_does_not_break_timing() {
        let mut c = GestureClassifier::new();
        let start = u32::MAX - 100;
        assert_eq!(c.update(true, start), None);
        assert_eq!(c.update(false, start.wrapping_add(200)), Some(Gesture::NormalPress));
    }
}
