//! Flick Core - DSP primitives for the flick pedal
//!
//! Stateful, allocation-free building blocks used by the pedal's signal
//! chain. Every type allocates (if at all) in its constructor and never in
//! `process`, so the whole crate is safe to drive from an audio callback.
//!
//! # Core Abstractions
//!
//! ## Oscillators
//!
//! - [`Lfo`] - Phase-accumulator LFO with sine, triangle and rounded square
//!
//! ## Filters
//!
//! - [`Biquad`] - Direct Form I section fed by RBJ designs ([`biquad::peaking`],
//!   [`biquad::low_shelf`], [`biquad::lowpass`], [`biquad::highpass`])
//! - [`OnePole`] / [`OnePoleHighpass`] - 6 dB/oct smoothers and band splitters
//! - [`CombFilter`] - Damped feedback comb
//! - [`AllpassFilter`] / [`ModulatedAllpass`] - Lattice diffusers
//!
//! ## Delay and Control
//!
//! - [`InterpolatedDelay`] - Fixed-capacity circular buffer with fractional reads
//! - [`SmoothedParam`] - Exponential glide for per-block control values
//! - [`NoteDivision`] - Subdivisions of a tapped beat
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! flick-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod param;
pub mod tempo;

pub use allpass::{AllpassFilter, ModulatedAllpass};
pub use biquad::{Biquad, BiquadCoefficients};
pub use comb::CombFilter;
pub use delay::InterpolatedDelay;
pub use lfo::{Lfo, LfoWaveform};
pub use math::{db_to_linear, flush_denormal, hard_clip, lerp, log_scale, pitch_to_hz};
pub use one_pole::{OnePole, OnePoleHighpass};
pub use param::SmoothedParam;
pub use tempo::NoteDivision;
