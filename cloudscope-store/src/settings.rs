//! User settings.
//!
//! Persisted as pretty JSON next to the session flags. Missing fields take
//! their defaults so older files keep loading.

use std::path::Path;
use std::time::Duration;

use cloudscope_fetch::{DEFAULT_AZURE_SECRET, DEFAULT_BACKEND_URL, FetchSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};
use crate::storage::StorageBackend;

/// Overrides [`Settings::backend_url`].
pub const BACKEND_URL_ENV: &str = "CLOUDSCOPE_BACKEND_URL";

/// Overrides [`Settings::azure_secret`].
pub const AZURE_SECRET_ENV: &str = "CLOUDSCOPE_AZURE_SECRET";

// ============================================================================
// Settings Types
// ============================================================================

/// User settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the billing/monitoring and GCP auth service.
    pub backend_url: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Latency of the simulated AWS verification, in milliseconds.
    pub simulated_auth_latency_ms: u64,

    /// Secret the Azure verifier accepts.
    pub azure_secret: String,

    /// Outbound domain allowlist. `None` allows any host.
    pub allowed_domains: Option<Vec<String>>,

    /// Log level.
    pub log_level: LogLevel,

    /// Where session flags are kept.
    pub storage: StorageBackend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: 30,
            simulated_auth_latency_ms: 1000,
            azure_secret: DEFAULT_AZURE_SECRET.to_string(),
            allowed_domains: None,
            log_level: LogLevel::default(),
            storage: StorageBackend::default(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("backend_url", &self.backend_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("simulated_auth_latency_ms", &self.simulated_auth_latency_ms)
            .field("azure_secret", &"<redacted>")
            .field("allowed_domains", &self.allowed_domains)
            .field("log_level", &self.log_level)
            .field("storage", &self.storage)
            .finish()
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    Warn,
    /// Info level logging.
    #[default]
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Loading & Saving
// ============================================================================

impl Settings {
    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(&default_settings_path()).await
    }

    /// Loads settings from `path` and applies environment overrides.
    ///
    /// A missing file yields defaults. A corrupt file is logged and also
    /// yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the loaded values are unusable.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let mut settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings to `path`.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Applies `CLOUDSCOPE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(BACKEND_URL_ENV) {
            debug!(env = BACKEND_URL_ENV, "Overriding backend URL");
            self.backend_url = url.trim().to_string();
        }
        if let Some(secret) = non_empty(AZURE_SECRET_ENV) {
            debug!(env = AZURE_SECRET_ENV, "Overriding Azure secret");
            self.azure_secret = secret;
        }
    }

    /// Checks values that would otherwise fail later at first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.backend_url.trim().is_empty() {
            return Err(StoreError::Config("backend_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(StoreError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Projects these settings into the fetch layer's settings.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            backend_url: self.backend_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            simulated_auth_latency: Duration::from_millis(self.simulated_auth_latency_ms),
            azure_secret: self.azure_secret.clone(),
            allowed_domains: self.allowed_domains.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
