//! Key-value storage backends for persisted session flags.
//!
//! - [`MemoryStorage`] - Process-local, used by tests and ephemeral sessions
//! - [`JsonFileStorage`] - A private JSON file under the config directory
//! - [`KeychainStorage`](crate::keychain::KeychainStorage) - System keychain

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::keychain::KeychainStorage;
use crate::persistence::{load_json_or_default, save_json};

// ============================================================================
// Trait
// ============================================================================

/// String key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, if present.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// Backend Selection
// ============================================================================

/// Which storage backend persists session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory; nothing survives a restart.
    Memory,
    /// JSON file in the config directory.
    #[default]
    File,
    /// System keychain.
    Keychain,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Keychain => write!(f, "keychain"),
        }
    }
}

/// Opens the selected backend. `path` is only used by the file backend.
pub async fn open_storage(backend: StorageBackend, path: &Path) -> Arc<dyn KeyValueStore> {
    debug!(backend = %backend, "Opening flag storage");
    match backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(JsonFileStorage::open(path).await),
        StorageBackend::Keychain => Arc::new(KeychainStorage::new()),
    }
}

// ============================================================================
// Memory Storage
// ============================================================================

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all entries.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON File Storage
// ============================================================================

/// Storage backed by a JSON object on disk.
///
/// Entries are cached in memory and written through on every change.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStorage {
    /// Opens the file at `path`. A missing or unreadable file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_json_or_default(&path).await;
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        save_json(&self.path, &*entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            save_json(&self.path, &*entries).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("gcp_authenticated").await.unwrap(), None);

        storage.set("gcp_authenticated", "true").await.unwrap();
        assert_eq!(
            storage.get("gcp_authenticated").await.unwrap().as_deref(),
            Some("true")
        );

        storage.remove("gcp_authenticated").await.unwrap();
        storage.remove("gcp_authenticated").await.unwrap();
        assert!(storage.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.json");

        let storage = JsonFileStorage::open(&path).await;
        storage.set("gcp_project_id", "proj-123").await.unwrap();
        drop(storage);

        let reopened = JsonFileStorage::open(&path).await;
        assert_eq!(
            reopened.get("gcp_project_id").await.unwrap().as_deref(),
            Some("proj-123")
        );
    }

    #[tokio::test]
    async fn test_file_storage_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let storage = JsonFileStorage::open(&path).await;
        assert_eq!(storage.get("username").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let storage = open_storage(StorageBackend::Memory, Path::new("unused")).await;
        storage.set("username", "Ada").await.unwrap();
        assert_eq!(storage.get("username").await.unwrap().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_backend_serde() {
        let json = serde_json::to_string(&StorageBackend::Keychain).unwrap();
        assert_eq!(json, "\"keychain\"");
        assert_eq!(StorageBackend::default(), StorageBackend::File);
    }
}
