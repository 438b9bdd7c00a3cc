//! Property-based tests for settings persistence.

use flick_config::{
    DefaultReason, FileStorage, LoadOutcome, MemoryStorage, PersistedSettings, SCHEMA_VERSION, SettingsStorage,
    SettingsStore,
};
use proptest::prelude::*;

fn valid_settings() -> impl Strategy<Value = PersistedSettings> {
    (
        prop::array::uniform7(0.0f32..=1.0),
        0.0f32..=0.25,
        0u8..3,
        0u8..3,
        prop::array::uniform3(any::<bool>()),
    )
        .prop_map(|(unit, pre_delay, mono, makeup, bypass)| PersistedSettings {
            version: SCHEMA_VERSION,
            decay: unit[0],
            diffusion: unit[1],
            input_cutoff: unit[2] * 10.0,
            tank_cutoff: unit[3] * 10.0,
            tank_mod_speed: unit[4],
            tank_mod_depth: unit[5],
            tank_mod_shape: unit[6],
            pre_delay,
            mono_stereo_mode: mono,
            makeup_gain: makeup,
            bypass_reverb: bypass[0],
            bypass_delay: bypass[1],
            bypass_tremolo: bypass[2],
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Saving and reloading under the same schema reproduces every field.
    #[test]
    fn memory_round_trip_is_exact(settings in valid_settings()) {
        let mut storage = MemoryStorage::new();
        storage.save(&settings).unwrap();
        let (store, outcome) = SettingsStore::load(&mut storage, PersistedSettings::default());
        prop_assert_eq!(outcome, LoadOutcome::Loaded);
        prop_assert_eq!(*store.record(), settings);
    }

    /// The TOML backend is just as exact.
    #[test]
    fn file_round_trip_is_exact(settings in valid_settings()) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("settings.toml"));
        storage.save(&settings).unwrap();
        let (store, outcome) = SettingsStore::load(&mut storage, PersistedSettings::default());
        prop_assert_eq!(outcome, LoadOutcome::Loaded);
        prop_assert_eq!(*store.record(), settings);
    }

    /// A record from any other schema loads as exactly the defaults.
    #[test]
    fn foreign_version_yields_exact_defaults(settings in valid_settings(), version in any::<u32>()) {
        prop_assume!(version != SCHEMA_VERSION);
        let old = PersistedSettings { version, ..settings };
        let mut storage = MemoryStorage::with_settings(&old);
        let (store, outcome) = SettingsStore::load(&mut storage, PersistedSettings::default());
        prop_assert_eq!(outcome, LoadOutcome::Defaulted(DefaultReason::VersionMismatch { found: version }));
        prop_assert_eq!(*store.record(), PersistedSettings::default());
    }

    /// Any byte block of full length decodes without panicking, and loading
    /// it never yields an out-of-range enum index.
    #[test]
    fn arbitrary_bytes_never_break_loading(mut bytes in prop::collection::vec(any::<u8>(), 41..64)) {
        bytes[0..4].copy_from_slice(&SCHEMA_VERSION.to_le_bytes());
        let decoded = PersistedSettings::from_bytes(&bytes).unwrap();
        let clean = decoded.sanitized();
        prop_assert!(clean.mono_stereo_mode < 3);
        prop_assert!(clean.makeup_gain < 3);
        prop_assert!((0.0..=1.0).contains(&clean.decay));
        prop_assert!((0.0..=0.25).contains(&clean.pre_delay));
    }
}
