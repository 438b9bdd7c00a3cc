//! Circular-buffer delay line with fractional reads.
//!
//! The buffer is allocated once in [`InterpolatedDelay::new`] and never
//! resized, so reads and writes are safe to call from the audio callback.
//! The pedal uses one 2-second line per channel for the echo, and short
//! lines inside the reverb networks.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Delay line with linearly interpolated reads.
///
/// ```rust
/// use flick_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(64);
/// delay.write(1.0);
/// for _ in 0..9 {
///     delay.write(0.0);
/// }
/// assert_eq!(delay.read(9.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a line holding up to `max_delay_samples` samples (at least one).
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1)],
            write_pos: 0,
        }
    }

    /// Creates a line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds).max(0.0) as usize + 1)
    }

    /// Reads the sample written `delay_samples` writes ago.
    ///
    /// A delay of 0 returns the most recent write. The delay is clamped to
    /// `[0, capacity - 1]`.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let newer = (self.write_pos + len - whole - 1) % len;
        let older = (newer + len - 1) % len;
        let a = self.buffer[newer];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Appends a sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_delay() {
        let mut delay = InterpolatedDelay::new(16);
        delay.write(1.0);
        for _ in 0..4 {
            delay.write(0.0);
        }
        assert_eq!(delay.read(4.0), 1.0);
        assert_eq!(delay.read(3.0), 0.0);
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut delay = InterpolatedDelay::new(16);
        delay.write(1.0);
        delay.write(0.0);
        let v = delay.read(0.5);
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_delay_clamped_to_capacity() {
        let mut delay = InterpolatedDelay::new(8);
        for _ in 0..8 {
            delay.write(0.25);
        }
        assert_eq!(delay.read(1000.0), 0.25);
        assert_eq!(delay.read(-3.0), 0.25);
    }

    #[test]
    fn test_clear() {
        let mut delay = InterpolatedDelay::new(8);
        for _ in 0..8 {
            delay.write(1.0);
        }
        delay.clear();
        assert_eq!(delay.read(3.0), 0.0);
    }

    #[test]
    fn test_from_time() {
        let delay = InterpolatedDelay::from_time(48000.0, 2.0);
        assert_eq!(delay.capacity(), 96001);
    }
}
