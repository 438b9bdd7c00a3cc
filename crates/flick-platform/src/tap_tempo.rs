//! Tap tempo.
//!
//! The interval between two taps sets a beat. The beat becomes the delay
//! time and/or the tremolo rate, depending on which of the two effects were
//! running when tap tempo was entered.

use flick_effects::{MAX_DELAY_SECONDS, MAX_TREMOLO_HZ, MIN_DELAY_SECONDS, MIN_TREMOLO_HZ};

/// Shortest accepted tap interval.
pub const MIN_TAP_INTERVAL_MS: u32 = 20;
/// Longest accepted tap interval.
pub const MAX_TAP_INTERVAL_MS: u32 = 4000;
/// Tap tempo ends after this long without a tap.
pub const TAP_TIMEOUT_MS: u32 = 5000;

/// Which effects the tapped tempo drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapTargets {
    /// Tempo sets the delay time.
    pub delay: bool,
    /// Tempo sets the tremolo rate.
    pub tremolo: bool,
}

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapResult {
    /// First tap of a session; nothing to measure yet.
    First,
    /// Interval accepted as the new tempo.
    Accepted {
        /// Measured interval.
        interval_ms: u32,
    },
    /// Interval outside the accepted range; the tempo is unchanged.
    Rejected {
        /// Measured interval.
        interval_ms: u32,
    },
}

/// Delay time in samples for a beat of `interval_ms`.
pub fn delay_samples_for(interval_ms: u32, sample_rate: f32) -> f32 {
    let samples = interval_ms as f32 / 1000.0 * sample_rate;
    samples.clamp(MIN_DELAY_SECONDS * sample_rate, MAX_DELAY_SECONDS * sample_rate)
}

/// Tremolo rate in Hz for a beat of `interval_ms`.
pub fn tremolo_hz_for(interval_ms: u32) -> f32 {
    (1000.0 / interval_ms.max(1) as f32).clamp(MIN_TREMOLO_HZ, MAX_TREMOLO_HZ)
}

/// Tap tempo session state.
#[derive(Debug, Clone)]
pub struct TapTempoEngine {
    sample_rate: f32,
    active: bool,
    targets: TapTargets,
    entered_ms: u32,
    last_tap_ms: Option<u32>,
    interval_ms: Option<u32>,
}

impl TapTempoEngine {
    /// Inactive engine for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            active: false,
            targets: TapTargets::default(),
            entered_ms: 0,
            last_tap_ms: None,
            interval_ms: None,
        }
    }

    /// Starts a session driving `targets`. Any previous tempo is forgotten.
    pub fn begin(&mut self, targets: TapTargets, now_ms: u32) {
        self.active = true;
        self.targets = targets;
        self.entered_ms = now_ms;
        self.last_tap_ms = None;
        self.interval_ms = None;
    }

    /// Ends the session. The last tempo stays readable.
    pub fn end(&mut self) {
        self.active = false;
        self.last_tap_ms = None;
    }

    /// Registers a tap at `now_ms`.
    ///
    /// A rejected interval still makes this tap the reference for the next
    /// one.
    pub fn tap(&mut self, now_ms: u32) -> TapResult {
        let previous = self.last_tap_ms.replace(now_ms);
        let Some(previous) = previous else {
            return TapResult::First;
        };
        let interval_ms = now_ms.wrapping_sub(previous);
        if (MIN_TAP_INTERVAL_MS..=MAX_TAP_INTERVAL_MS).contains(&interval_ms) {
            self.interval_ms = Some(interval_ms);
            #[cfg(feature = "tracing")]
            tracing::debug!(interval_ms, "tap accepted");
            TapResult::Accepted { interval_ms }
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(interval_ms, "tap rejected");
            TapResult::Rejected { interval_ms }
        }
    }

    /// True once [`TAP_TIMEOUT_MS`] has passed since the last tap (or since
    /// entry, before the first tap).
    pub fn timed_out(&self, now_ms: u32) -> bool {
        let since = self.last_tap_ms.unwrap_or(self.entered_ms);
        self.active && now_ms.wrapping_sub(since) >= TAP_TIMEOUT_MS
    }

    /// True during a session.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Effects driven by this session.
    pub fn targets(&self) -> TapTargets {
        self.targets
    }

    /// Last accepted interval.
    pub fn interval_ms(&self) -> Option<u32> {
        self.interval_ms
    }

    /// Timestamp of the last tap in this session.
    pub fn last_tap_ms(&self) -> Option<u32> {
        self.last_tap_ms
    }

    /// Delay time derived from the tempo.
    pub fn delay_time_samples(&self) -> Option<f32> {
        self.interval_ms.map(|i| delay_samples_for(i, self.sample_rate))
    }

    /// Tremolo rate derived from the tempo.
    pub fn tremolo_hz(&self) -> Option<f32> {
        self.interval_ms.map(tremolo_hz_for)
    }
}
