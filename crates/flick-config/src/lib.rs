//! Versioned persistent settings for the flick pedal.
//!
//! # Features
//!
//! - **Record**: [`PersistedSettings`] with a fixed little-endian byte layout
//!   and a strict schema-version gate
//! - **Store**: [`SettingsStore`] owns the live record and coalesces saves
//!   through a single [`FlushRequest`] flag
//! - **Backends**: [`MemoryStorage`] (one flash-style block) and, with `std`,
//!   [`FileStorage`] (TOML)
//!
//! # Example
//!
//! ```rust
//! use flick_config::{LoadOutcome, MemoryStorage, PersistedSettings, SettingsStore};
//! use flick_effects::{MakeupGain, MonoStereoMode};
//!
//! let mut flash = MemoryStorage::new();
//! let (mut store, outcome) = SettingsStore::load(&mut flash, PersistedSettings::default());
//! assert!(matches!(outcome, LoadOutcome::Defaulted(_)));
//!
//! store.commit_routing(MonoStereoMode::Siso, MakeupGain::Heavy);
//! assert!(store.flush_if_requested(&mut flash).unwrap());
//! assert_eq!(flash.writes(), 1);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod error;
mod settings;
mod storage;
mod store;

pub use error::ConfigError;
pub use settings::{PersistedSettings, RECORD_LEN, SCHEMA_VERSION};
#[cfg(feature = "std")]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, SettingsStorage};
pub use store::{DefaultReason, FlushRequest, LoadOutcome, SettingsStore};
