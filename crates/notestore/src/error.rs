//! Error types for notestore.
//!
//! This module defines all error types used throughout the notestore crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Why a backing file could not be turned into a note collection.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The file was read but its contents are not a note collection.
    #[error("malformed content: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The main error type for notestore operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to load the note collection from its backing file.
    #[error("failed to load notes from {path}: {source}")]
    Load {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: LoadError,
    },

    /// Failed to write the note collection to its backing file.
    #[error("failed to persist notes to {path}: {source}")]
    Persist {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the note collection.
    #[error("failed to encode notes: {0}")]
    Encode(#[source] serde_json::Error),

    /// An index passed to a mutating operation does not name a note.
    #[error("index {index} out of range for {len} notes")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of notes at the time of the call.
        len: usize,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for notestore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Check if this error was caused by the caller passing a bad index.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }

    /// Check if this error came from reading or writing the backing file.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::Load { .. } | Self::Persist { .. } | Self::Encode(_) | Self::DirectoryCreate { .. }
        )
    }
}
