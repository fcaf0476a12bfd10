//! Persistence round-trip and edge case tests.
//!
//! Covers settings files and file-backed session flags across restarts.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, save_json};
use crate::session_store::SessionStore;
use crate::settings::{LogLevel, Settings};
use crate::storage::{JsonFileStorage, StorageBackend, open_storage};
use crate::vault::CredentialVault;
use cloudscope_core::{ProviderKind, SessionIdentifiers};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    let data = serde_json::json!({"key": "value"});
    save_json(&nested_path, &data).await.unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");
    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();
    assert!(dir_path.is_dir());
}

#[tokio::test]
async fn test_atomic_write() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("atomic.json");

    save_json(&file_path, &Settings::default()).await.unwrap();

    assert!(!file_path.with_extension("json.tmp").exists());
    assert!(file_path.exists());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let settings = Settings {
        request_timeout_secs: 5,
        simulated_auth_latency_ms: 0,
        allowed_domains: Some(vec!["billing.internal".into()]),
        log_level: LogLevel::Debug,
        storage: StorageBackend::Keychain,
        ..Settings::default()
    };
    settings.save(&file_path).await.unwrap();

    let loaded = Settings::load(&file_path).await.unwrap();
    assert_eq!(loaded.request_timeout_secs, 5);
    assert_eq!(loaded.simulated_auth_latency_ms, 0);
    assert_eq!(loaded.allowed_domains, Some(vec!["billing.internal".to_string()]));
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert_eq!(loaded.storage, StorageBackend::Keychain);
}

#[tokio::test]
async fn test_missing_settings_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = Settings::load(&temp_dir.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(loaded.request_timeout_secs, 30);
    assert_eq!(loaded.storage, StorageBackend::File);
}

#[tokio::test]
async fn test_corrupt_settings_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let loaded = Settings::load(&file_path).await.unwrap();
    assert_eq!(loaded.simulated_auth_latency_ms, 1000);
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "request_timeout_secs": 12,
        "refresh_cadence": "two_minutes",
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(loaded.request_timeout_secs, 12);
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, r#"{"request_timeout_secs": 0}"#)
        .await
        .unwrap();

    assert!(Settings::load(&file_path).await.is_err());
}

// ============================================================================
// Session Flags Across Restarts
// ============================================================================

#[tokio::test]
async fn test_file_backed_session_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session_flags.json");

    {
        let vault = CredentialVault::new(open_storage(StorageBackend::File, &path).await);
        vault
            .set(
                ProviderKind::Gcp,
                &SessionIdentifiers::new().with("project_id", "proj-123"),
            )
            .await;
        vault.set_username("Ada").await;
    }

    let vault = CredentialVault::new(Arc::new(JsonFileStorage::open(&path).await));
    let store = SessionStore::restored(vault).await;

    let session = store.session(ProviderKind::Gcp).await;
    assert!(session.is_authenticated());
    assert_eq!(session.scope_id(), Some("proj-123"));
    assert!(!store.is_authenticated(ProviderKind::Aws).await);
    assert_eq!(store.vault().username().await, "Ada");
}

#[tokio::test]
async fn test_sign_out_wipes_flag_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session_flags.json");

    let vault = CredentialVault::new(open_storage(StorageBackend::File, &path).await);
    vault
        .set(
            ProviderKind::Azure,
            &SessionIdentifiers::new().with("key_hint", "****-key"),
        )
        .await;
    let store = SessionStore::restored(vault).await;
    store.sign_out().await;

    let on_disk: std::collections::BTreeMap<String, String> = load_json(&path).await.unwrap();
    assert!(on_disk.is_empty());
}
