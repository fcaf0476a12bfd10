//! Flag storage in the system keychain.
//!
//! Each flag is a separate keychain entry under the `CloudScope` service:
//! - macOS: Keychain Services
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Keychain calls block; they run on the blocking thread pool.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use crate::error::StoreError;
use crate::storage::KeyValueStore;

/// Service name for `CloudScope` keychain entries.
const SERVICE_NAME: &str = "CloudScope";

/// Keychain-backed flag storage.
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl Default for KeychainStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeychainStorage {
    /// Creates storage under the default service name.
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Creates storage under a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key)?;
            op(entry).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for KeychainStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.to_string();
        self.with_entry(key, move |entry| entry.set_password(&value))
            .await?;
        debug!(key, "Flag stored in keychain");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
