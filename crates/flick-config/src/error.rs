//! Error types for settings persistence.

#[cfg(feature = "std")]
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing settings.
///
/// None of these stop the pedal: [`SettingsStore::load`](crate::SettingsStore::load)
/// turns every one of them into compiled-in defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stored byte block is shorter than a full record
    #[error("settings record too short: {len} bytes, expected {expected}")]
    RecordTooShort {
        /// Bytes available.
        len: usize,
        /// Bytes a record needs.
        expected: usize,
    },

    /// Failed to read a file
    #[cfg(feature = "std")]
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[cfg(feature = "std")]
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[cfg(feature = "std")]
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[cfg(feature = "std")]
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The storage backend refused the operation
    #[error("storage backend error: {0}")]
    Storage(&'static str),
}

#[cfg(feature = "std")]
impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
