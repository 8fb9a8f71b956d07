//! Flat JSON file key-value store.
//!
//! The whole map is read on every `get` and rewritten on every `set`; the
//! store holds a handful of small records, so there is no cache.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{data_dir, KeyValueStore};
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/tomatick/store.json`.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::OpenFailed {
            path: "~/.config/tomatick".into(),
            message: e.to_string(),
        })?;
        Ok(Self::new(dir.join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self, key: &str) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        };
        serde_json::from_str(&content).map_err(|e| StorageError::ReadFailed {
            key: key.to_string(),
            message: format!("{}: {e}", self.path.display()),
        })
    }

    fn write_map(&self, key: &str, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_failed = |message: String| StorageError::WriteFailed {
            key: key.to_string(),
            message,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(map).map_err(|e| write_failed(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| write_failed(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map(key)?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut map = self.read_map(key).unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.write_map(key, &map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map(key).unwrap_or_default();
        if map.remove(key).is_some() {
            self.write_map(key, &map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/store.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_is_a_read_error_but_writable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        let mut store = JsonFileStore::new(&path);
        assert!(store.get("a").is_err());
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
