//! Error types for preset operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or resolving presets.
///
/// Loading is all-or-nothing: any of these means no preset was produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory key is absent
    #[error("missing field '{0}'")]
    MissingField(String),

    /// An oscillator slot names an unknown waveform
    #[error("unknown oscillator '{value}' for '{field}' (expected sine, triangle, square or saw)")]
    UnknownOscillator {
        /// Key of the slot (`osc1`, `osc2` or `osc3`).
        field: String,
        /// The value found.
        value: String,
    },

    /// The filter key names an unknown response
    #[error("unknown filter '{0}' (expected lowpass, highpass or bandpass)")]
    UnknownFilter(String),

    /// A key is present but its value has the wrong type or range
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Offending key.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Neither a preset file nor a factory preset of that name exists
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

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

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Key the error is about, for errors tied to a single key.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField(field)
            | ConfigError::UnknownOscillator { field, .. }
            | ConfigError::InvalidValue { field, .. } => Some(field),
            ConfigError::UnknownFilter(_) => Some("filter"),
            _ => None,
        }
    }
}
