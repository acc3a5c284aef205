//! Error types for the kiosk binary.
//!
//! [`KioskError`] covers everything that can stop the kiosk during
//! startup. Once the server or the station loop is running, failures are
//! logged and absorbed.

/// Top-level startup error for the kiosk binary.
#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    /// Configuration loading or catalog validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: kultoura_core::config::ConfigError,
    },

    /// A store or sink backend could not be opened.
    #[error("storage error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: kultoura_store::StoreError,
    },

    /// The API server failed to start or stop.
    #[error("server error: {source}")]
    Server {
        /// The underlying startup error.
        #[from]
        source: kultoura_server::StartupError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
