//! TOML-based application configuration.
//!
//! Holds the preferences that are not part of the persisted timer record:
//! - which key-value back end stores that record
//! - ambient audio defaults (start-up volume, on/off default track)
//! - whether the completion alarm sounds
//! - the log filter
//!
//! Configuration is stored at `~/.config/tomatick/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{data_dir, ConfigStore, Database, JsonFileStore, KeyValueStore, MemoryStore};
use crate::assets::DEFAULT_AMBIENT_TRACK;
use crate::error::{ConfigError, StorageError};

/// Where the settings record lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Json,
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientConfig {
    #[serde(default = "default_track")]
    pub default_track: String,
    /// Start-up volume, 0.0 ..= 1.0.
    #[serde(default = "default_volume")]
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tomatick/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// `tracing-subscriber` filter directive, overridden by TOMATICK_LOG.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ambient: AmbientConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}
fn default_track() -> String {
    DEFAULT_AMBIENT_TRACK.into()
}
fn default_volume() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_log_filter() -> String {
    "warn".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            default_track: default_track(),
            volume: default_volume(),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            storage: StorageConfig::default(),
            ambient: AmbientConfig::default(),
            alarm: AlarmConfig::default(),
        }
    }
}

impl AppConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            let n = value
                                .parse::<f64>()
                                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/tomatick"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from `~/.config/tomatick/config.toml`, writing the defaults there
    /// on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadFailed`] if the file exists but cannot be
    /// read or parsed. The file is left untouched in that case.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| load_failed(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(load_failed(e.to_string())),
        }
    }

    /// Load the configuration and open the settings store it selects.
    ///
    /// # Errors
    ///
    /// Fails if the config file is unreadable or the store cannot be opened.
    pub fn load_with_store() -> crate::error::Result<(Self, ConfigStore)> {
        Self::load_with_store_from(&Self::path()?)
    }

    pub fn load_with_store_from(path: &Path) -> crate::error::Result<(Self, ConfigStore)> {
        let config = Self::load_from(path)?;
        let store = ConfigStore::new(config.open_store()?);
        Ok((config, store))
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Start-up ambient volume, clamped to `[0, 1]`.
    pub fn ambient_volume(&self) -> f64 {
        if self.ambient.volume.is_finite() {
            self.ambient.volume.clamp(0.0, 1.0)
        } else {
            default_volume()
        }
    }

    /// Open the key-value store the settings record lives in.
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>, StorageError> {
        Ok(match self.storage.backend {
            StorageBackend::Sqlite => Box::new(Database::open()?),
            StorageBackend::Json => Box::new(JsonFileStore::open_default()?),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
