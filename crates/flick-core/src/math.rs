//! Small numeric helpers shared across the signal chain.
//!
//! All functions are allocation-free and `no_std`.

use libm::{expf, logf, powf};

/// Converts decibels to linear gain.
///
/// ```rust
/// use flick_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-20.0) - 0.1).abs() < 0.001);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Hard clip to `[-threshold, threshold]`.
///
/// NaN inputs map to 0 so a corrupted sample cannot poison downstream
/// feedback loops.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-threshold, threshold)
    }
}

/// Linear interpolation from `a` to `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Maps `x` in [0, 1] onto `[min, max]` along an exponential curve, the
/// taper of a logarithmic potentiometer. `min` must be positive.
///
/// ```rust
/// use flick_core::log_scale;
///
/// assert!((log_scale(0.0, 0.05, 2.0) - 0.05).abs() < 1e-6);
/// assert!((log_scale(1.0, 0.05, 2.0) - 2.0).abs() < 1e-5);
/// ```
#[inline]
pub fn log_scale(x: f32, min: f32, max: f32) -> f32 {
    let lmin = logf(min);
    let lmax = logf(max);
    expf(x.clamp(0.0, 1.0) * (lmax - lmin) + lmin).clamp(min, max)
}

/// Converts a pitch value in filter-control units to Hz, where 5.0 is 440 Hz
/// and every unit is an octave: `440 * 2^(pitch - 5)`.
#[inline]
pub fn pitch_to_hz(pitch: f32) -> f32 {
    440.0 * powf(2.0, pitch - 5.0)
}

/// Flushes values below 1e-20 to zero.
///
/// Feedback loops decaying into the subnormal range cost tens of times more
/// CPU per operation on most targets.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
