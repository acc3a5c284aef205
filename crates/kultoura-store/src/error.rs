//! Error types for the state store.
//!
//! Read-side variants are usually absorbed by the fail-open reads of
//! [`crate::EventStateStore`]; write-side variants always reach the caller.

use std::path::PathBuf;

/// Errors that can occur in a state store or score sink backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The state file could not be read.
    #[error("failed to read state file {path}: {source}")]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The state file (or its directory) could not be written.
    #[error("failed to write state file {path}: {source}")]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The remote kiosk host failed or answered with an error.
    #[error("remote store error: {0}")]
    Remote(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether this error came from the read side of a store.
    pub const fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Serialization(_))
    }

    /// Whether the store could not be reached at all.
    ///
    /// Only remote stores fail this way. A local store that cannot be read
    /// is a read fault instead.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
