//! Second-order IIR sections with RBJ cookbook designs.
//!
//! The pedal uses biquads for the two fixed hardware notches (very narrow
//! peaking cuts) and for the shelving/peaking stages that shape the harmonic
//! tremolo. Designs are plain functions returning [`BiquadCoefficients`] so
//! they can be computed once at initialization and copied into any number of
//! per-channel [`Biquad`] instances.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

use crate::math::flush_denormal;

/// Normalized biquad coefficients (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Identity section: `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Builds coefficients from the raw cookbook terms, normalizing by `a0`.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// Magnitude response at DC.
    pub fn dc_gain(&self) -> f32 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::PASSTHROUGH
    }
}

/// Direct Form I biquad:
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a passthrough section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a section with the given coefficients and cleared state.
    pub fn with_coefficients(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            ..Self::default()
        }
    }

    /// Replaces the coefficients, keeping the filter state.
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        let output = flush_denormal(output);

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Zeroes the delay elements without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[inline]
fn omega(frequency: f32, sample_rate: f32) -> f32 {
    // Keep the design below Nyquist so a low sample rate cannot fold the notch.
    let nyquist_guard = sample_rate * 0.499;
    2.0 * PI * frequency.clamp(1.0, nyquist_guard) / sample_rate
}

/// Low-pass design.
pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    BiquadCoefficients::from_raw(
        (1.0 - cos_w) / 2.0,
        1.0 - cos_w,
        (1.0 - cos_w) / 2.0,
        1.0 + alpha,
        -2.0 * cos_w,
        1.0 - alpha,
    )
}

/// High-pass design.
pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    BiquadCoefficients::from_raw(
        (1.0 + cos_w) / 2.0,
        -(1.0 + cos_w),
        (1.0 + cos_w) / 2.0,
        1.0 + alpha,
        -2.0 * cos_w,
        1.0 - alpha,
    )
}

/// Peaking EQ design. A large negative `gain_db` with a high `q` gives a
/// narrow notch.
///
/// Uses `A = 10^(gain_db / 40)`.
pub fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0);
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let alpha = sinf(w) / (2.0 * q);

    BiquadCoefficients::from_raw(
        1.0 + alpha * a,
        -2.0 * cos_w,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_w,
        1.0 - alpha / a,
    )
}

/// Low-shelf design with shelf slope `slope` (1.0 is the steepest slope
/// without overshoot).
pub fn low_shelf(frequency: f32, slope: f32, gain_db: f32, sample_rate: f32) -> BiquadCoefficients {
    let a = powf(10.0, gain_db / 40.0);
    let w = omega(frequency, sample_rate);
    let cos_w = cosf(w);
    let slope = slope.max(0.01);
    let alpha = sinf(w) / 2.0 * sqrtf(((a + 1.0 / a) * (1.0 / slope - 1.0) + 2.0).max(0.0));
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    BiquadCoefficients::from_raw(
        a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
        a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha),
        (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
        (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha,
    )
}
