// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # CloudScope Store
//!
//! Durable state for the CloudScope console.
//!
//! This crate provides:
//!
//! - **SessionStore**: Per-provider session state machine with watch channels
//! - **CredentialVault**: Persisted session flags and identifiers
//! - **Storage backends**: Memory, JSON file and system keychain
//! - **Settings**: User settings with persistence and env overrides
//!
//! ## Usage
//!
//! ```ignore
//! use cloudscope_store::{CredentialVault, SessionStore, Settings, open_storage};
//!
//! let settings = Settings::load_default().await?;
//! let storage = open_storage(settings.storage, &default_vault_path()).await;
//! let sessions = SessionStore::restored(CredentialVault::new(storage)).await;
//!
//! let mut rx = sessions.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Sessions updated!");
//! }
//! ```

pub mod error;
pub mod keychain;
pub mod persistence;
pub mod session_store;
pub mod settings;
pub mod storage;
pub mod vault;

pub use error::StoreError;
pub use keychain::KeychainStorage;
pub use persistence::{
    default_config_dir, default_settings_path, default_vault_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use session_store::SessionStore;
pub use settings::{AZURE_SECRET_ENV, BACKEND_URL_ENV, LogLevel, Settings};
pub use storage::{JsonFileStorage, KeyValueStore, MemoryStorage, StorageBackend, open_storage};
pub use vault::{CredentialVault, DEFAULT_USERNAME, USERNAME_KEY};

#[cfg(test)]
mod persistence_tests;
