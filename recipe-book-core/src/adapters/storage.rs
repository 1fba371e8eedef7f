//! Key-value storage adapters
//!
//! - `MemoryStorage` keeps everything in a map (tests, ephemeral sessions)
//! - `FileStorage` keeps the map in `storage.json` inside the data directory

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

const STORAGE_FILE: &str = "storage.json";
const LOCK_FILE: &str = "storage.lock";

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

/// File-backed storage shared between CLI invocations.
///
/// Every operation takes a lock on `storage.lock` (shared for reads,
/// exclusive for writes) so that two processes never interleave a
/// read-modify-write of the map.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage in `dir`, creating the directory when needed
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    fn open_lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(file)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| Error::storage(format!("corrupt storage file {:?}: {}", path, e)))
    }

    /// Like `read_map`, but a corrupt file is moved to `storage.json.corrupt`
    /// and writing starts over from an empty map
    fn read_map_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.read_map() {
            Err(Error::Storage(msg)) => {
                let aside = self.dir.join(format!("{}.corrupt", STORAGE_FILE));
                tracing::warn!("{}, moving it to {:?}", msg, aside);
                fs::rename(self.path(), &aside)?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.dir.join(format!("{}.tmp", STORAGE_FILE));
        fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        fs::rename(&tmp, self.path())?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_map_for_write().and_then(|mut map| {
            f(&mut map);
            self.write_map(&map)
        });

        lock.unlock()?;
        result
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.read_map().map(|map| map.get(key).cloned());
        lock.unlock()?;
        result
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|map| {
            map.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.get("token").unwrap().is_none());

        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.len(), 1);

        storage.remove("token").unwrap();
        storage.remove("token").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let storage = FileStorage::new(temp_dir.path()).unwrap();
            storage.set("token", "abc").unwrap();
            storage.set("shoppingList", "[]").unwrap();
        }

        let storage = FileStorage::new(temp_dir.path()).unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.get("shoppingList").unwrap().as_deref(), Some("[]"));

        storage.remove("token").unwrap();
        assert!(storage.get("token").unwrap().is_none());
        assert!(storage.get("shoppingList").unwrap().is_some());
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        assert!(storage.get("missing").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert!(nested.join("storage.json").exists());
    }

    #[test]
    fn test_file_storage_reports_corruption() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("storage.json"), "{ not json").unwrap();

        let storage = FileStorage::new(temp_dir.path()).unwrap();
        let err = storage.get("token").unwrap_err();
        assert!(err.to_string().contains("corrupt storage file"));
    }

    #[test]
    fn test_file_storage_recovers_from_corruption_on_write() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("storage.json"), "{ not json").unwrap();

        let storage = FileStorage::new(temp_dir.path()).unwrap();
        storage.set("token", "abc").unwrap();

        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        let aside = std::fs::read_to_string(temp_dir.path().join("storage.json.corrupt")).unwrap();
        assert_eq!(aside, "{ not json");

        std::fs::write(temp_dir.path().join("storage.json"), "[1, 2]").unwrap();
        storage.remove("token").unwrap();
        assert!(storage.get("token").unwrap().is_none());
    }
}
