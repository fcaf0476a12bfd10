//! Fetch context providing access to backend collaborators.
//!
//! The fetch context is handed to authenticators, the catalog service and
//! the telemetry aggregator. It bundles the three collaborator seams with
//! the settings they share.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{AuthBackend, CatalogBackend, TelemetryBackend};
use crate::error::FetchError;
use crate::remote::RemoteBackend;

/// Default backend base URL.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Default Azure secret accepted by the local verifier.
pub const DEFAULT_AZURE_SECRET: &str = "valid-key";

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for collaborator calls.
#[derive(Clone)]
pub struct FetchSettings {
    /// Backend base URL.
    pub backend_url: String,
    /// Timeout for HTTP requests.
    pub timeout: Duration,
    /// Latency of the simulated AWS verification.
    pub simulated_auth_latency: Duration,
    /// Secret accepted by the Azure verifier.
    pub azure_secret: String,
    /// Optional outbound domain allowlist.
    pub allowed_domains: Option<Vec<String>>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(30),
            simulated_auth_latency: Duration::from_millis(1000),
            azure_secret: DEFAULT_AZURE_SECRET.to_string(),
            allowed_domains: None,
        }
    }
}

impl FetchSettings {
    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the simulated authentication latency.
    #[must_use]
    pub fn with_auth_latency(mut self, latency: Duration) -> Self {
        self.simulated_auth_latency = latency;
        self
    }
}

impl fmt::Debug for FetchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSettings")
            .field("backend_url", &self.backend_url)
            .field("timeout", &self.timeout)
            .field("simulated_auth_latency", &self.simulated_auth_latency)
            .field("azure_secret", &"<redacted>")
            .field("allowed_domains", &self.allowed_domains)
            .finish()
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Collaborators plus the settings they were built from.
#[derive(Clone)]
pub struct FetchContext {
    /// Service-account exchange.
    pub auth: Arc<dyn AuthBackend>,
    /// Enabled API listing.
    pub catalog: Arc<dyn CatalogBackend>,
    /// API details.
    pub telemetry: Arc<dyn TelemetryBackend>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context talking to the default backend.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context talking to the backend named in `settings`.
    pub fn with_settings(settings: FetchSettings) -> Result<Self, FetchError> {
        Self::builder().settings(settings).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the effective HTTP timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}

impl fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
///
/// Any collaborator left unset is served by a [`RemoteBackend`] built from
/// the settings.
#[derive(Default)]
pub struct FetchContextBuilder {
    auth: Option<Arc<dyn AuthBackend>>,
    catalog: Option<Arc<dyn CatalogBackend>>,
    telemetry: Option<Arc<dyn TelemetryBackend>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses one backend for all three collaborators.
    #[must_use]
    pub fn backend<B>(mut self, backend: Arc<B>) -> Self
    where
        B: AuthBackend + CatalogBackend + TelemetryBackend + 'static,
    {
        self.auth = Some(backend.clone());
        self.catalog = Some(backend.clone());
        self.telemetry = Some(backend);
        self
    }

    /// Sets the service-account exchange.
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AuthBackend>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the enabled API listing.
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn CatalogBackend>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the API details collaborator.
    #[must_use]
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetryBackend>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the simulated authentication latency.
    #[must_use]
    pub fn auth_latency(mut self, latency: Duration) -> Self {
        self.settings.simulated_auth_latency = latency;
        self
    }

    /// Sets the secret accepted by the Azure verifier.
    #[must_use]
    pub fn azure_secret(mut self, secret: impl Into<String>) -> Self {
        self.settings.azure_secret = secret.into();
        self
    }

    /// Builds the fetch context.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if a remote backend is needed and
    /// the configured base URL does not parse.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let settings = self.settings;
        let mut remote: Option<Arc<RemoteBackend>> = None;
        let mut remote_backend = || -> Result<Arc<RemoteBackend>, FetchError> {
            if let Some(existing) = &remote {
                return Ok(Arc::clone(existing));
            }
            let created = Arc::new(RemoteBackend::new(&settings)?);
            remote = Some(Arc::clone(&created));
            Ok(created)
        };

        let auth: Arc<dyn AuthBackend> = match self.auth {
            Some(auth) => auth,
            None => remote_backend()?,
        };
        let catalog: Arc<dyn CatalogBackend> = match self.catalog {
            Some(catalog) => catalog,
            None => remote_backend()?,
        };
        let telemetry: Arc<dyn TelemetryBackend> = match self.telemetry {
            Some(telemetry) => telemetry,
            None => remote_backend()?,
        };

        Ok(FetchContext {
            auth,
            catalog,
            telemetry,
            settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
