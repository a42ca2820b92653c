//! Local key-value persistence for every collection the client keeps.
//!
//! Reads never fail from the caller's point of view: a missing key or
//! unparseable content yields an empty collection. Writes are best-effort and
//! only logged when they fail.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Schedules,
    Routines,
    Todos,
    Memos,
    RoutineCompletions,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Schedules => "schedules",
            Collection::Routines => "routines",
            Collection::Todos => "todos",
            Collection::Memos => "memos",
            Collection::RoutineCompletions => "routineCompletions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries.write().insert(key.to_string(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

/// Typed gateway over a [`KeyValueStore`].
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn from_boxed(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load<T>(&self, collection: Collection) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self.store.get(collection.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(%collection, %err, "unable to read collection, using empty value");
                return T::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(%collection, %err, "stored collection is malformed, using empty value");
                T::default()
            }
        }
    }

    pub fn save<T>(&self, collection: Collection, value: &T)
    where
        T: Serialize + ?Sized,
    {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%collection, %err, "unable to serialize collection");
                return;
            }
        };
        match self.store.set(collection.key(), &raw) {
            Ok(()) => debug!(%collection, bytes = raw.len(), "collection saved"),
            Err(err) => warn!(%collection, %err, "unable to persist collection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DdayError;
    use crate::model::ScheduleItem;
    use chrono::NaiveDate;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(DdayError::Io(std::io::Error::other("disk gone")))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(DdayError::Io(std::io::Error::other("quota exceeded")))
        }
    }

    #[test]
    fn missing_key_loads_empty_collection() {
        let persistence = Persistence::new(MemoryStore::new());
        let items: Vec<ScheduleItem> = persistence.load(Collection::Schedules);
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_content_loads_empty_collection() {
        let store = MemoryStore::new();
        store.insert_raw("schedules", "{not json");
        let persistence = Persistence::new(store);
        let items: Vec<ScheduleItem> = persistence.load(Collection::Schedules);
        assert!(items.is_empty());
    }

    #[test]
    fn failing_store_never_surfaces_errors() {
        let persistence = Persistence::new(BrokenStore);
        let items: Vec<ScheduleItem> = persistence.load(Collection::Schedules);
        assert!(items.is_empty());
        persistence.save(Collection::Schedules, &items);
    }

    #[test]
    fn saved_collection_reads_back() {
        let persistence = Persistence::new(MemoryStore::new());
        let items = vec![ScheduleItem {
            id: "s1".into(),
            title: "Exam".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            memo: None,
        }];
        persistence.save(Collection::Schedules, &items);
        let loaded: Vec<ScheduleItem> = persistence.load(Collection::Schedules);
        assert_eq!(loaded, items);
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(temp.path().join("data"));
        assert_eq!(store.get("memos").unwrap(), None);
        store.set("memos", "[]").unwrap();
        assert_eq!(store.get("memos").unwrap().as_deref(), Some("[]"));
        assert!(temp.path().join("data/memos.json").is_file());
        assert!(!temp.path().join("data/memos.json.tmp").exists());
    }
}
