//! Persistent Key-Value Store
//!
//! A string-keyed string store used for favorite marks and voice preferences.
//! Surfaces pick the backing: [`MemoryStore`] for tests and headless use,
//! [`FileStore`] for the terminal app.
//!
//! The store is shared between the favorites set and the speaker, and all
//! access happens on the single event-handling thread, so it is handed around
//! as a [`SharedStore`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

/// Errors from store writes. Reads never fail; missing or corrupt data reads as absent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write the store file
    #[error("Failed to write store file at {path}: {source}")]
    Write {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to encode entries
    #[error("Failed to encode store entries: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backing store refused the write
    #[error("Store is read-only")]
    ReadOnly,
}

/// String key-value persistence
pub trait KeyValueStore {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Store handle shared by favorites and speech preferences
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with preset entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            read_only: false,
        }
    }

    /// Make every subsequent write fail (simulates a full or locked disk)
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Wrap into a shared handle
    #[must_use]
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a single JSON object file
///
/// The whole file is rewritten on every `set`. An unreadable or corrupt file
/// opens as an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, Value>>(&text) {
                Ok(raw) => string_entries(&path, raw),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Corrupt store file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Unreadable store file, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json).map_err(write_err)
    }
}

/// Keep the string-valued entries; anything else reads as absent
fn string_entries(path: &Path, raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            other => {
                tracing::warn!(path = ?path, key = %key, value = %other, "Dropping non-string store entry");
                None
            }
        })
        .collect()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_memory_store_read_only() {
        let mut store = MemoryStore::with_entries([("k", "v")]);
        store.set_read_only(true);
        assert!(matches!(store.set("k", "w"), Err(StoreError::ReadOnly)));
        assert_eq!(store.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_file_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path);
        assert_eq!(store.path(), path.as_path());
        store.set("chuleta:ttsRate", "1.2").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("chuleta:ttsRate"), Some("1.2".to_string()));
    }

    #[test]
    fn test_file_store_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_file_store_drops_only_non_string_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"chuleta:favorites": "[\"vocab::dog|perro\"]", "chuleta:ttsRate": 1.2}"#,
        )
        .unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get("chuleta:ttsRate"), None);
        assert_eq!(
            store.get("chuleta:favorites").as_deref(),
            Some(r#"["vocab::dog|perro"]"#)
        );

        store.set("chuleta:ttsVoiceURI", "en-gb").unwrap();
        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("chuleta:favorites").as_deref(),
            Some(r#"["vocab::dog|perro"]"#)
        );
        assert_eq!(reopened.get("chuleta:ttsVoiceURI").as_deref(), Some("en-gb"));
    }

    #[test]
    fn test_shared_store_coerces_to_trait_object() {
        let concrete = MemoryStore::new().shared();
        let shared: SharedStore = concrete.clone();
        shared.borrow_mut().set("a", "b").unwrap();
        assert_eq!(concrete.borrow().get("a"), Some("b".to_string()));
    }
}
