//! Collaborator traits.
//!
//! Each backend concern is a separate seam so authenticators, the catalog
//! service and the telemetry aggregator can be exercised against fakes.
//! [`RemoteBackend`](crate::RemoteBackend) implements all three over HTTP.

use async_trait::async_trait;
use cloudscope_core::{ProviderKind, ServiceAccountFile};

use crate::error::FetchError;
use crate::wire::{TelemetryRequest, TelemetryResponse};

/// Exchanges an uploaded service-account file for a project id.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Sends `file` to the backend and returns the project id it resolved.
    async fn authenticate_service_account(
        &self,
        file: &ServiceAccountFile,
    ) -> Result<String, FetchError>;
}

/// Lists the APIs enabled for a scope.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Returns canonical API identifiers enabled for `scope_id`.
    async fn enabled_apis(
        &self,
        provider: ProviderKind,
        scope_id: &str,
    ) -> Result<Vec<String>, FetchError>;
}

/// Fetches billing and utilization for one API.
#[async_trait]
pub trait TelemetryBackend: Send + Sync {
    /// Returns the raw API details response.
    async fn api_details(&self, request: &TelemetryRequest)
    -> Result<TelemetryResponse, FetchError>;
}
