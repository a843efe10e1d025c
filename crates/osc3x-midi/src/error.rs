//! Error types for MIDI loading and scheduling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a MIDI file or scheduling one of its tracks.
///
/// All of them occur before any note is dispatched.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The requested track does not exist
    #[error("track {index} is out of range (the sequence has {count} tracks)")]
    TrackOutOfRange {
        /// Requested track index.
        index: usize,
        /// Number of tracks in the sequence.
        count: usize,
    },

    /// The bytes are not a valid Standard MIDI File
    #[error("failed to parse MIDI file: {0}")]
    Parse(#[from] midly::Error),

    /// SMPTE timecode files carry no ticks-per-beat resolution
    #[error("unsupported timing: {0} (only ticks-per-beat files can be scheduled)")]
    UnsupportedTiming(String),

    /// Tempo or resolution would make tick conversion meaningless
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

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
}

impl MidiError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MidiError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MidiError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
