mod config;
pub mod database;
pub mod json_file;
pub mod memory;
mod settings;

pub use config::{AlarmConfig, AmbientConfig, AppConfig, StorageBackend, StorageConfig};
pub use database::Database;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use settings::{parse_record, ConfigStore, PersistedRecord, SETTINGS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Key-value persistence service the settings record is written to.
///
/// Values are opaque strings; the record is read and written wholesale.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Returns `~/.config/tomatick[-dev]/` based on TOMATICK_ENV.
///
/// Set TOMATICK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TOMATICK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tomatick-dev")
    } else {
        base_dir.join("tomatick")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
