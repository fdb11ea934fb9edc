//! Core error types for prayerhour-core.
//!
//! The cycle state machine itself never fails; these types cover the fallible
//! edges around it: opening the durable store, reading `config.toml`, and
//! parsing user-supplied settings keys.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for prayerhour-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value backend errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open storage at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Backend cannot be used at all (probe write failed)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key is not one of the whitelisted settings
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_wraps_into_core_error() {
        let err: CoreError = StorageError::Unavailable("probe failed".into()).into();
        assert_eq!(err.to_string(), "Storage error: Storage unavailable: probe failed");
    }

    #[test]
    fn unknown_key_message_names_the_key() {
        let err = ConfigError::UnknownKey("theme".into());
        assert_eq!(err.to_string(), "Unknown key: theme");
    }
}
