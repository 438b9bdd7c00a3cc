//! Signal chain of the flick pedal.
//!
//! - [`Pipeline`] - per-sample routing, notches, delay, tremolo and reverb
//! - [`EffectParameters`] - the block-rate snapshot the pipeline reads
//! - [`StereoDelay`] - smoothed-time feedback echo
//! - [`Tremolo`] - sine, rounded-square and harmonic tremolo
//! - [`reverb`] - the [`ReverbEngine`] contract with plate, spring and hall engines
//!
//! ## Example
//!
//! ```rust
//! use flick_effects::{EffectParameters, Pipeline};
//!
//! let mut pipeline = Pipeline::new(48000.0);
//! let mut params = EffectParameters::new(48000.0);
//! params.bypass.reverb = false;
//! pipeline.update(&params);
//!
//! let (left, right) = pipeline.process_frame(0.25, 0.25);
//! assert!(left.is_finite() && right.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod delay;
pub mod notch;
pub mod params;
pub mod pipeline;
pub mod reverb;
pub mod tremolo;

pub use delay::StereoDelay;
pub use notch::NotchStage;
pub use params::{
    BypassState, EffectParameters, MAX_DELAY_SECONDS, MAX_TREMOLO_HZ, MIN_DELAY_SECONDS, MIN_TREMOLO_HZ, MakeupGain,
    MonoStereoMode, ReverbMix, TremoloMode,
};
pub use pipeline::{Pipeline, reverb_send_gain};
pub use reverb::{HallReverb, PlateReverb, ReverbEngine, ReverbParams, ReverbSelector, ReverbType, SpringReverb};
pub use tremolo::Tremolo;
