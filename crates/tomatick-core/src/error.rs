//! Core error types for tomatick-core.
//!
//! Nothing in the core is fatal. These errors exist so fallible internals can
//! use `?`; the component boundaries log them and fall back to defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomatick-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Key-value persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Read failed
    #[error("Failed to read key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Write failed (quota, permissions, locked database)
    #[error("Failed to write key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Database is locked
    #[error("Store is locked")]
    Locked,
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration or the persisted settings record
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Audio playback errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Asset identifier not in the catalog or not loadable
    #[error("Audio asset not found: {0}")]
    AssetNotFound(String),

    /// Output device refused playback (autoplay policy, no device)
    #[error("Playback unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
