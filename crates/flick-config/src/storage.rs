//! Durable storage backends for [`PersistedSettings`].

#[cfg(feature = "std")]
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::{PersistedSettings, RECORD_LEN};

/// Where the settings record lives between power cycles.
pub trait SettingsStorage {
    /// Reads the stored record, or `None` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<PersistedSettings>, ConfigError>;

    /// Replaces the stored record.
    fn save(&mut self, settings: &PersistedSettings) -> Result<(), ConfigError>;
}

/// A single flash-style byte block holding one encoded record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    block: Option<[u8; RECORD_LEN]>,
    writes: usize,
}

impl MemoryStorage {
    /// An erased block.
    pub fn new() -> Self {
        Self::default()
    }

    /// A block pre-loaded with `settings`. Does not count as a write.
    pub fn with_settings(settings: &PersistedSettings) -> Self {
        Self {
            block: Some(settings.to_bytes()),
            writes: 0,
        }
    }

    /// Raw block contents, if any.
    pub fn bytes(&self) -> Option<&[u8; RECORD_LEN]> {
        self.block.as_ref()
    }

    /// Number of [`SettingsStorage::save`] calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStorage for MemoryStorage {
    fn load(&mut self) -> Result<Option<PersistedSettings>, ConfigError> {
        self.block.as_ref().map(|bytes| PersistedSettings::from_bytes(bytes)).transpose()
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), ConfigError> {
        self.block = Some(settings.to_bytes());
        self.writes += 1;
        Ok(())
    }
}

/// Settings kept in a TOML file, for the host tool and the simulator.
///
/// ```toml
/// version = 5
/// decay = 0.8
/// diffusion = 0.85
/// input_cutoff = 7.25
/// tank_cutoff = 7.25
/// tank_mod_speed = 0.1
/// tank_mod_depth = 0.1
/// tank_mod_shape = 0.25
/// pre_delay = 0.0
/// mono_stereo_mode = 0
/// makeup_gain = 1
/// bypass_reverb = true
/// bypass_delay = true
/// bypass_tremolo = true
/// ```
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

#[cfg(feature = "std")]
impl FileStorage {
    /// Storage backed by the file at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses a record from TOML text.
    pub fn from_toml(toml_str: &str) -> Result<PersistedSettings, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Renders a record as pretty TOML.
    pub fn to_toml(settings: &PersistedSettings) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(settings)?)
    }
}

#[cfg(feature = "std")]
impl SettingsStorage for FileStorage {
    fn load(&mut self) -> Result<Option<PersistedSettings>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::read_file(&self.path, e)),
        };
        Self::from_toml(&content).map(Some)
    }

    fn save(&mut self, settings: &PersistedSettings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::write_file(parent, e))?;
        }

        let content = Self::to_toml(settings)?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::write_file(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_starts_empty() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn memory_storage_round_trips_and_counts_writes() {
        let mut storage = MemoryStorage::new();
        let mut settings = PersistedSettings::default();
        settings.pre_delay = 0.125;
        storage.save(&settings).unwrap();
        storage.save(&settings).unwrap();
        assert_eq!(storage.load().unwrap(), Some(settings));
        assert_eq!(storage.writes(), 2);
    }

    #[cfg(feature = "std")]
    mod file {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn missing_file_is_an_empty_slot() {
            let dir = TempDir::new().unwrap();
            let mut storage = FileStorage::new(dir.path().join("absent.toml"));
            assert!(storage.load().unwrap().is_none());
        }

        #[test]
        fn save_creates_parent_directories() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("nested").join("deeper").join("settings.toml");
            let mut storage = FileStorage::new(&path);
            let mut settings = PersistedSettings::default();
            settings.bypass_reverb = false;
            settings.mono_stereo_mode = 1;
            storage.save(&settings).unwrap();
            assert!(path.exists());
            assert_eq!(storage.load().unwrap(), Some(settings));
        }

        #[test]
        fn garbage_file_is_a_parse_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("broken.toml");
            std::fs::write(&path, "version = \"five\"").unwrap();
            let err = FileStorage::new(&path).load().unwrap_err();
            assert!(matches!(err, ConfigError::TomlParse(_)));
        }

        #[test]
        fn toml_uses_field_names() {
            let text = FileStorage::to_toml(&PersistedSettings::default()).unwrap();
            assert!(text.contains("version = 5"));
            assert!(text.contains("bypass_tremolo = true"));
        }
    }
}
