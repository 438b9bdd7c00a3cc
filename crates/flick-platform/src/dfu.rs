//! Firmware-update escape hatch: both footswitches held for five seconds.

/// Dual hold needed to enter the bootloader.
pub const DFU_HOLD_MS: u32 = 5000;
/// Alternating LED flashes before the reset.
pub const DFU_FLASH_COUNT: usize = 3;
/// Duration of each half of a flash.
pub const DFU_FLASH_MS: u32 = 100;

/// Tracks how long both footswitches have been down.
#[derive(Debug, Clone, Copy, Default)]
pub struct DfuHold {
    held_since_ms: Option<u32>,
}

impl DfuHold {
    /// No hold in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the dual hold has lasted [`DFU_HOLD_MS`].
    pub fn update(&mut self, both_held: bool, now_ms: u32) -> bool {
        if !both_held {
            self.held_since_ms = None;
            return false;
        }
        let since = *self.held_since_ms.get_or_insert(now_ms);
        now_ms.wrapping_sub(since) >= DFU_HOLD_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_five_seconds() {
        let mut hold = DfuHold::new();
        assert!(!hold.update(true, 1000));
        assert!(!hold.update(true, 5999));
        assert!(hold.update(true, 6000));
    }

    #[test]
    fn release_restarts_the_timer() {
        let mut hold = DfuHold::new();
        hold.update(true, 0);
        assert!(!hold.update(false, 4000));
        assert!(!hold.update(true, 4500));
        assert!(!hold.update(true, 9000));
        assert!(hold.update(true, 9500));
    }
}
