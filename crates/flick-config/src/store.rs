//! In-memory settings record with a coalesced flush handoff.
//!
//! The audio context commits edits into the record and raises the
//! [`FlushRequest`]; the control loop later observes the flag and writes the
//! whole record once, however many commits happened in between.

use core::sync::atomic::{AtomicBool, Ordering};

use flick_effects::{BypassState, MakeupGain, MonoStereoMode, ReverbParams};

use crate::error::ConfigError;
use crate::settings::{PersistedSettings, SCHEMA_VERSION};
use crate::storage::SettingsStorage;

/// Single-flag request from the audio context to the control loop.
///
/// Last writer wins; flushing the same record twice is harmless.
#[derive(Debug, Default)]
pub struct FlushRequest(AtomicBool);

impl FlushRequest {
    /// Asks for a flush.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consumes a pending request, returning whether there was one.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// True while a request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Why [`SettingsStore::load`] fell back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// Nothing had been saved.
    EmptySlot,
    /// The stored record was written by a different schema.
    VersionMismatch {
        /// Version found in storage.
        found: u32,
    },
    /// The storage could not be read or decoded.
    Unreadable,
}

/// Result of loading settings at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A record with the current schema was found.
    Loaded,
    /// Defaults are in use.
    Defaulted(DefaultReason),
}

/// Owner of the live settings record.
#[derive(Debug)]
pub struct SettingsStore {
    record: PersistedSettings,
    defaults: PersistedSettings,
    flush: FlushRequest,
}

impl SettingsStore {
    /// Loads from `storage`, never failing.
    ///
    /// A record whose version differs from [`SCHEMA_VERSION`] is discarded
    /// whole and the defaults are scheduled to be written back. A matching
    /// record is sanitized field by field.
    pub fn load<S: SettingsStorage>(storage: &mut S, defaults: PersistedSettings) -> (Self, LoadOutcome) {
        let defaults = PersistedSettings {
            version: SCHEMA_VERSION,
            ..defaults
        };
        let (record, outcome) = match storage.load() {
            Ok(Some(stored)) if stored.version == SCHEMA_VERSION => (stored.sanitized(), LoadOutcome::Loaded),
            Ok(Some(stored)) => (
                defaults,
                LoadOutcome::Defaulted(DefaultReason::VersionMismatch { found: stored.version }),
            ),
            Ok(None) => (defaults, LoadOutcome::Defaulted(DefaultReason::EmptySlot)),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("settings unreadable, using defaults: {_e}");
                (defaults, LoadOutcome::Defaulted(DefaultReason::Unreadable))
            }
        };

        #[cfg(feature = "tracing")]
        tracing::info!("settings load: {outcome:?}");

        let store = Self {
            record,
            defaults,
            flush: FlushRequest::default(),
        };
        if matches!(outcome, LoadOutcome::Defaulted(DefaultReason::VersionMismatch { .. })) {
            store.request_flush();
        }
        (store, outcome)
    }

    /// The live record.
    pub fn record(&self) -> &PersistedSettings {
        &self.record
    }

    /// The compiled-in defaults this store restores to.
    pub fn defaults(&self) -> &PersistedSettings {
        &self.defaults
    }

    /// Saves edited plate parameters and requests a flush.
    pub fn commit_reverb(&mut self, params: &ReverbParams) {
        self.record.set_reverb_params(&params.sanitized());
        self.request_flush();
    }

    /// Saves routing mode and makeup tier and requests a flush.
    pub fn commit_routing(&mut self, mode: MonoStereoMode, makeup: MakeupGain) {
        self.record.mono_stereo_mode = mode.index();
        self.record.makeup_gain = makeup.index();
        self.request_flush();
    }

    /// Saves the bypass flags and requests a flush.
    pub fn commit_bypass(&mut self, bypass: BypassState) {
        self.record.set_bypass(bypass);
        self.request_flush();
    }

    /// Replaces the record with the defaults and requests a flush.
    pub fn restore_defaults(&mut self) {
        self.record = self.defaults;
        self.request_flush();
    }

    /// Asks the control loop to write the record.
    pub fn request_flush(&self) {
        self.flush.request();
    }

    /// Consumes a pending flush request.
    pub fn take_flush_request(&self) -> bool {
        self.flush.take()
    }

    /// The shared flush flag.
    pub fn flush_request(&self) -> &FlushRequest {
        &self.flush
    }

    /// Writes the record if a flush was requested. Returns whether a write
    /// happened. A failed write re-arms the request so the next call retries.
    pub fn flush_if_requested<S: SettingsStorage>(&self, storage: &mut S) -> Result<bool, ConfigError> {
        if !self.take_flush_request() {
            return Ok(false);
        }
        match storage.save(&self.record) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("settings flushed");
                Ok(true)
            }
            Err(e) => {
                self.request_flush();
                Err(e)
            }
        }
    }
}
