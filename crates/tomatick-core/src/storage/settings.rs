//! Persisted settings record.
//!
//! Durations and the background identifier are stored together as one JSON
//! object under [`SETTINGS_KEY`]:
//!
//! ```json
//! { "pomodoro": 25, "short": 5, "long": 10, "sequence": false,
//!   "backgroundImage": "photo1.webp" }
//! ```
//!
//! Loading is forgiving. A missing record yields the defaults, a record that
//! does not parse yields the defaults, and a partial record is default-filled
//! key by key.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::assets::FALLBACK_BACKGROUND;
use crate::error::{ConfigError, StorageError};
use crate::timer::{Durations, DEFAULT_LONG_MIN, DEFAULT_POMODORO_MIN, DEFAULT_SHORT_MIN};

/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "pomodoroSettings";

/// On-disk shape of the record. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    #[serde(default = "default_pomodoro")]
    pub pomodoro: i64,
    #[serde(default = "default_short")]
    pub short: i64,
    #[serde(default = "default_long")]
    pub long: i64,
    #[serde(default)]
    pub sequence: bool,
    #[serde(default = "default_background")]
    pub background_image: String,
}

fn default_pomodoro() -> i64 {
    DEFAULT_POMODORO_MIN.into()
}
fn default_short() -> i64 {
    DEFAULT_SHORT_MIN.into()
}
fn default_long() -> i64 {
    DEFAULT_LONG_MIN.into()
}
fn default_background() -> String {
    FALLBACK_BACKGROUND.into()
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self::from_parts(&Durations::default(), FALLBACK_BACKGROUND)
    }
}

impl PersistedRecord {
    pub fn from_parts(durations: &Durations, background_image: &str) -> Self {
        Self {
            pomodoro: durations.pomodoro.into(),
            short: durations.short.into(),
            long: durations.long.into(),
            sequence: durations.sequence,
            background_image: background_image.to_string(),
        }
    }

    /// Durations with every value forced to at least one minute.
    pub fn durations(&self) -> Durations {
        Durations::new(
            to_minutes(self.pomodoro),
            to_minutes(self.short),
            to_minutes(self.long),
            self.sequence,
        )
    }

    /// Background identifier, the fallback when the stored one is blank.
    pub fn background_image(&self) -> &str {
        if self.background_image.trim().is_empty() {
            FALLBACK_BACKGROUND
        } else {
            &self.background_image
        }
    }
}

/// Out-of-range values map to 0, which [`Durations::new`] replaces with the
/// field default.
fn to_minutes(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Parse a raw record.
///
/// # Errors
/// Returns [`ConfigError::ParseFailed`] if `raw` is not a JSON object of the
/// expected shape.
pub fn parse_record(raw: &str) -> Result<PersistedRecord, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(ConfigError::ParseFailed(
            "settings record is not a JSON object".to_string(),
        ));
    }
    let record: PersistedRecord = serde_json::from_value(value)?;
    Ok(record)
}

/// Loads and saves the settings record through a key-value store.
pub struct ConfigStore {
    store: Box<dyn KeyValueStore>,
}

impl ConfigStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Read the record, falling back to defaults on any failure.
    pub fn load(&self) -> PersistedRecord {
        let raw = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no persisted settings; using defaults");
                return PersistedRecord::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted settings; using defaults");
                return PersistedRecord::default();
            }
        };
        match parse_record(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "discarding malformed persisted settings");
                PersistedRecord::default()
            }
        }
    }

    /// Overwrite the record.
    ///
    /// # Errors
    /// Returns the store's error; callers that must not fail use
    /// [`ConfigStore::save_or_log`].
    pub fn save(&mut self, durations: &Durations, background_image: &str) -> Result<(), StorageError> {
        let record = PersistedRecord::from_parts(durations, background_image);
        let raw = serde_json::to_string(&record).map_err(|e| StorageError::WriteFailed {
            key: SETTINGS_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(SETTINGS_KEY, &raw)
    }

    /// Overwrite the record, logging instead of failing. Returns whether the
    /// write went through.
    pub fn save_or_log(&mut self, durations: &Durations, background_image: &str) -> bool {
        match self.save(durations, background_image) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist settings");
                false
            }
        }
    }

    /// Remove the record so the next load yields defaults.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(SETTINGS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::ReadFailed {
                key: key.into(),
                message: "private mode".into(),
            })
        }
        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed {
                key: key.into(),
                message: "quota exceeded".into(),
            })
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn store_with(raw: &str) -> ConfigStore {
        ConfigStore::new(MemoryStore::with_entry(SETTINGS_KEY, raw))
    }

    #[test]
    fn missing_record_yields_defaults_and_fallback_background() {
        let record = ConfigStore::new(MemoryStore::new()).load();
        assert_eq!(record.durations(), Durations::default());
        assert_eq!(record.background_image(), "photo1.webp");
    }

    #[test]
    fn malformed_record_yields_defaults() {
        for raw in ["{not json", "[1,2,3]", "\"text\"", r#"{"pomodoro":"thirty"}"#] {
            let record = store_with(raw).load();
            assert_eq!(record, PersistedRecord::default(), "input: {raw}");
        }
    }

    #[test]
    fn partial_record_is_default_filled() {
        let record = store_with(r#"{"pomodoro":30}"#).load();
        assert_eq!(record.durations(), Durations::new(30, 5, 10, false));
        assert_eq!(record.background_image(), "photo1.webp");
    }

    #[test]
    fn full_record_round_trips() {
        let mut store = ConfigStore::new(MemoryStore::new());
        let durations = Durations::new(50, 10, 20, true);
        store.save(&durations, "photo3.webp").unwrap();
        let record = store.load();
        assert_eq!(record.durations(), durations);
        assert_eq!(record.background_image(), "photo3.webp");
    }

    #[test]
    fn saved_record_uses_camel_case_keys() {
        let record = PersistedRecord::default();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["backgroundImage"], "photo1.webp");
        assert_eq!(json["pomodoro"], 25);
        assert_eq!(json["sequence"], false);
    }

    #[test]
    fn non_positive_durations_fall_back_per_field() {
        let record = store_with(r#"{"pomodoro":0,"short":-3,"long":12}"#).load();
        assert_eq!(record.durations(), Durations::new(25, 5, 12, false));
    }

    #[test]
    fn blank_background_uses_fallback() {
        let record = store_with(r#"{"backgroundImage":""}"#).load();
        assert_eq!(record.background_image(), "photo1.webp");
    }

    #[test]
    fn store_failures_never_reach_the_caller() {
        let mut store = ConfigStore::new(FailingStore);
        assert_eq!(store.load(), PersistedRecord::default());
        assert!(!store.save_or_log(&Durations::default(), "photo2.webp"));
    }

    #[test]
    fn clear_restores_defaults() {
        let mut store = store_with(r#"{"pomodoro":45}"#);
        store.clear().unwrap();
        assert_eq!(store.load().durations().pomodoro, 25);
    }
}
