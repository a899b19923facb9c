//! Durable key-value primitive backing the alert history.
//!
//! Values are opaque strings; callers own the serialization format.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal durable store keyed by string.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; a missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key; removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One JSON file per key under a data directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value readable.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens the store, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file key-value store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for development and testing.
///
/// Can be switched into a failing mode where every write is rejected while
/// reads keep working.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    simulate_failure: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_simulate_failure(true);
        store
    }

    /// Store pre-populated with a single entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    /// Synchronous read, convenient for assertions.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(key = %key, "Simulating storage write failure");
            return Err(StorageError::Unavailable("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn temp_dir() -> PathBuf {
        let suffix: u64 = rand::thread_rng().gen();
        std::env::temp_dir().join(format!("seaguard-kv-{:x}", suffix))
    }

    #[test]
    fn test_key_validation() {
        assert!(check_key("geofence-alert-history").is_ok());
        assert!(check_key("a_b.c").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key(".hidden").is_err());
        assert!(check_key("with space").is_err());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = temp_dir();
        let store = FileKeyValueStore::open(&dir).await.unwrap();

        assert_eq!(store.get("history").await.unwrap(), None);

        store.set("history", "[1,2,3]").await.unwrap();
        assert_eq!(store.get("history").await.unwrap().as_deref(), Some("[1,2,3]"));
        assert!(dir.join("history.json").exists());
        assert!(!dir.join("history.json.tmp").exists());

        store.set("history", "[]").await.unwrap();
        assert_eq!(store.get("history").await.unwrap().as_deref(), Some("[]"));

        store.remove("history").await.unwrap();
        assert_eq!(store.get("history").await.unwrap(), None);
        store.remove("history").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_traversal() {
        let dir = temp_dir();
        let store = FileKeyValueStore::open(&dir).await.unwrap();
        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_failure_mode() {
        let store = MemoryKeyValueStore::with_entry("k", "v1");
        store.set_simulate_failure(true);

        assert!(matches!(
            store.set("k", "v2").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.set_simulate_failure(false);
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.snapshot("k").as_deref(), Some("v2"));
    }
}
