//! Console state.
//!
//! [`CloudConsole`] wires the fetch context, the session store and the two
//! read-side services together. It is cheap to clone; clones share state.

use cloudscope_core::{
    ApiResource, CatalogError, CredentialInput, ProviderKind, ProviderSession, SessionError,
    SessionStatus, TelemetryError, TelemetryRecord, TelemetryReport,
};
use cloudscope_fetch::FetchContext;
use cloudscope_providers::{ApiCatalogService, ProviderRegistry, TelemetryAggregator};
use cloudscope_store::{
    CredentialVault, SessionStore, Settings, default_vault_path, open_storage,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::ConsoleError;
use crate::views::ApiDetailsView;

// ============================================================================
// Overview
// ============================================================================

/// One dashboard card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOverview {
    /// Provider.
    pub provider: ProviderKind,
    /// Short name, e.g. `GCP`.
    pub display_name: &'static str,
    /// Session status.
    pub status: SessionStatus,
}

impl ProviderOverview {
    /// Returns true if the provider is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

// ============================================================================
// Console
// ============================================================================

/// Entry point for a presentation layer.
#[derive(Clone)]
pub struct CloudConsole {
    ctx: FetchContext,
    sessions: SessionStore,
    catalog: ApiCatalogService,
    telemetry: TelemetryAggregator,
}

impl CloudConsole {
    /// Builds a console from user settings, restoring persisted sessions.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Fetch`] if the HTTP client cannot be built.
    pub async fn from_settings(settings: &Settings) -> Result<Self, ConsoleError> {
        let ctx = FetchContext::with_settings(settings.fetch_settings())?;
        let storage = open_storage(settings.storage, &default_vault_path()).await;
        info!(backend = %settings.backend_url, storage = %settings.storage, "Console starting");
        Ok(Self::with_context(ctx, CredentialVault::new(storage)).await)
    }

    /// Builds a console over explicit collaborators and vault.
    pub async fn with_context(ctx: FetchContext, vault: CredentialVault) -> Self {
        let sessions = SessionStore::restored(vault).await;
        Self {
            catalog: ApiCatalogService::new(ctx.catalog.clone()),
            telemetry: TelemetryAggregator::new(ctx.telemetry.clone()),
            ctx,
            sessions,
        }
    }

    /// Returns the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the fetch context.
    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sessions.subscribe()
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Authenticates with the provider `input` belongs to.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::authenticate`].
    pub async fn authenticate(
        &self,
        input: CredentialInput,
    ) -> Result<ProviderSession, SessionError> {
        let authenticator = ProviderRegistry::build_authenticator(input.provider(), &self.ctx);
        self.sessions.authenticate(&authenticator, input).await
    }

    /// Returns a failed or pending provider to the sign-in form.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::reset`].
    pub async fn reset(&self, provider: ProviderKind) -> Result<(), SessionError> {
        self.sessions.reset(provider).await
    }

    /// Signs out of every provider.
    pub async fn sign_out(&self) {
        self.sessions.sign_out().await;
    }

    /// Returns the session for `provider`.
    pub async fn session(&self, provider: ProviderKind) -> ProviderSession {
        self.sessions.session(provider).await
    }

    /// Returns one card per provider, AWS then GCP then Azure.
    pub async fn provider_overview(&self) -> Vec<ProviderOverview> {
        let mut cards = Vec::with_capacity(ProviderKind::all().len());
        for provider in ProviderKind::all() {
            cards.push(ProviderOverview {
                provider: *provider,
                display_name: provider.display_name(),
                status: self.sessions.status(*provider).await,
            });
        }
        cards
    }

    /// Returns the dashboard username.
    pub async fn username(&self) -> String {
        self.sessions.vault().username().await
    }

    /// Sets the dashboard username.
    pub async fn set_username(&self, username: &str) {
        self.sessions.vault().set_username(username).await;
    }

    /// Returns the persisted GCP project id, if signed in.
    pub async fn gcp_project_id(&self) -> Option<String> {
        self.sessions.vault().gcp_project_id().await
    }

    // ========================================================================
    // Catalog & Telemetry
    // ========================================================================

    /// Lists the APIs enabled for `provider`.
    ///
    /// # Errors
    ///
    /// See [`ApiCatalogService::list_enabled_apis`].
    pub async fn list_enabled_apis(
        &self,
        provider: ProviderKind,
    ) -> Result<Vec<ApiResource>, CatalogError> {
        let session = self.sessions.session(provider).await;
        self.catalog.list_enabled_apis(&session).await
    }

    /// Fetches the telemetry record for one API.
    ///
    /// # Errors
    ///
    /// See [`TelemetryAggregator::fetch_telemetry`].
    pub async fn fetch_telemetry(
        &self,
        provider: ProviderKind,
        api_id: &str,
    ) -> Result<TelemetryRecord, TelemetryError> {
        let session = self.sessions.session(provider).await;
        self.telemetry.fetch_telemetry(api_id, &session).await
    }

    /// Fetches a telemetry report for one API.
    ///
    /// # Errors
    ///
    /// See [`TelemetryAggregator::fetch_report`].
    pub async fn fetch_report(
        &self,
        provider: ProviderKind,
        api_id: &str,
    ) -> Result<TelemetryReport, TelemetryError> {
        let session = self.sessions.session(provider).await;
        debug!(provider = %provider, api_id, "Fetching report");
        self.telemetry.fetch_report(api_id, &session).await
    }

    /// Fetches reports for several APIs concurrently.
    pub async fn fetch_many<S: AsRef<str>>(
        &self,
        provider: ProviderKind,
        api_ids: &[S],
    ) -> Vec<(String, Result<TelemetryReport, TelemetryError>)> {
        let session = self.sessions.session(provider).await;
        self.telemetry.fetch_many(api_ids, &session).await
    }

    /// Creates a details view bound to `provider`.
    pub fn details_view(&self, provider: ProviderKind) -> ApiDetailsView {
        ApiDetailsView::new(self.clone(), provider)
    }
}

impl std::fmt::Debug for CloudConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConsole")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
