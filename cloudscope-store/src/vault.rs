//! Persisted per-provider authentication flags.
//!
//! The vault writes these keys for each provider `p`:
//!
//! | Key | Value |
//! |-----|-------|
//! | `{p}_authenticated` | `"true"` while signed in |
//! | `{p}_{identifier}` | One entry per session identifier (e.g. `gcp_project_id`) |
//! | `{p}_authenticated_at` | RFC 3339 timestamp of the sign-in |
//!
//! plus a global `username` flag. Storage failures are logged and swallowed:
//! reads return `None`, writes are dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudscope_core::{ProviderKind, ProviderMetadata, ProviderSession, SessionIdentifiers};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::storage::{KeyValueStore, MemoryStorage};

/// Key of the global username flag.
pub const USERNAME_KEY: &str = "username";

/// Username shown when none is stored.
pub const DEFAULT_USERNAME: &str = "User";

const AUTHENTICATED_VALUE: &str = "true";

fn authenticated_key(provider: ProviderKind) -> String {
    format!("{}_authenticated", provider.cli_name())
}

fn authenticated_at_key(provider: ProviderKind) -> String {
    format!("{}_authenticated_at", provider.cli_name())
}

fn identifier_key(provider: ProviderKind, identifier: &str) -> String {
    format!("{}_{identifier}", provider.cli_name())
}

// ============================================================================
// Credential Vault
// ============================================================================

/// Durable per-provider session flags over an injected storage backend.
#[derive(Clone)]
pub struct CredentialVault {
    storage: Arc<dyn KeyValueStore>,
}

impl Default for CredentialVault {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CredentialVault {
    /// Creates a vault over `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Creates a vault over fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persists an authenticated session for `provider`.
    pub async fn set(&self, provider: ProviderKind, identifiers: &SessionIdentifiers) {
        self.set_at(provider, identifiers, Utc::now()).await;
    }

    /// Persists an authenticated session with an explicit timestamp.
    pub async fn set_at(
        &self,
        provider: ProviderKind,
        identifiers: &SessionIdentifiers,
        authenticated_at: DateTime<Utc>,
    ) {
        for (key, value) in identifiers.iter() {
            self.write(&identifier_key(provider, key), value).await;
        }
        self.write(
            &authenticated_at_key(provider),
            &authenticated_at.to_rfc3339(),
        )
        .await;
        // Written last so a partial write never reads back as signed in.
        self.write(&authenticated_key(provider), AUTHENTICATED_VALUE)
            .await;
        debug!(provider = %provider, "Session flags persisted");
    }

    /// Reads back the persisted session for `provider`.
    ///
    /// Returns `None` when the provider is not flagged as authenticated or
    /// its identifiers are missing.
    pub async fn get(&self, provider: ProviderKind) -> Option<ProviderSession> {
        if !self.has_flag(provider).await {
            return None;
        }

        let mut identifiers = SessionIdentifiers::new();
        for key in ProviderMetadata::for_provider(provider).identifier_keys {
            if let Some(value) = self.read(&identifier_key(provider, &key)).await {
                identifiers.insert(key, value);
            }
        }

        let created_at = self
            .read(&authenticated_at_key(provider))
            .await
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map_or_else(Utc::now, |t| t.with_timezone(&Utc));

        match ProviderSession::authenticated(provider, identifiers, created_at) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(provider = %provider, error = %e, "Ignoring incomplete persisted session");
                None
            }
        }
    }

    /// Removes every flag of `provider`.
    pub async fn clear(&self, provider: ProviderKind) {
        self.delete(&authenticated_key(provider)).await;
        self.delete(&authenticated_at_key(provider)).await;
        for key in ProviderMetadata::for_provider(provider).identifier_keys {
            self.delete(&identifier_key(provider, &key)).await;
        }
        debug!(provider = %provider, "Session flags cleared");
    }

    /// Removes the flags of every provider and the username.
    pub async fn clear_all(&self) {
        for provider in ProviderKind::all() {
            self.clear(*provider).await;
        }
        self.delete(USERNAME_KEY).await;
    }

    /// Returns true if `provider` has a complete persisted session.
    ///
    /// A flag without its identifiers does not count.
    pub async fn is_authenticated(&self, provider: ProviderKind) -> bool {
        self.get(provider).await.is_some()
    }

    async fn has_flag(&self, provider: ProviderKind) -> bool {
        self.read(&authenticated_key(provider))
            .await
            .is_some_and(|v| v == AUTHENTICATED_VALUE)
    }

    /// Returns the persisted GCP project id.
    pub async fn gcp_project_id(&self) -> Option<String> {
        if !self.is_authenticated(ProviderKind::Gcp).await {
            return None;
        }
        self.read(&identifier_key(
            ProviderKind::Gcp,
            ProviderKind::Gcp.scope_identifier(),
        ))
        .await
    }

    /// Returns the stored username, or `"User"`.
    pub async fn username(&self) -> String {
        self.read(USERNAME_KEY)
            .await
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
    }

    /// Stores the username.
    pub async fn set_username(&self, username: &str) {
        self.write(USERNAME_KEY, username).await;
    }

    // ========================================================================
    // Silent storage access
    // ========================================================================

    async fn read(&self, key: &str) -> Option<String> {
        self.storage
            .get(key)
            .await
            .unwrap_or_else(|e| log_failure("read", key, &e))
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value).await {
            log_failure::<()>("write", key, &e);
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.storage.remove(key).await {
            log_failure::<()>("remove", key, &e);
        }
    }
}

fn log_failure<T: Default>(op: &str, key: &str, err: &StoreError) -> T {
    warn!(op, key, transient = err.is_transient(), error = %err, "Flag storage failed");
    T::default()
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
