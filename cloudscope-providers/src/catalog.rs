//! Enabled API listing.

use std::collections::HashSet;
use std::sync::Arc;

use cloudscope_core::{ApiResource, CatalogError, ProviderSession};
use cloudscope_fetch::CatalogBackend;
use tracing::{debug, instrument, warn};

/// Message when the backend fails without saying why.
pub const CATALOG_FAILED_MESSAGE: &str = "Failed to fetch enabled APIs";

/// Lists the APIs enabled for an authenticated session.
#[derive(Clone)]
pub struct ApiCatalogService {
    backend: Arc<dyn CatalogBackend>,
}

impl ApiCatalogService {
    /// Creates a service backed by `backend`.
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend }
    }

    /// Returns the enabled APIs in backend order, with display names.
    ///
    /// Blank and repeated identifiers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotAuthenticated`] without calling the
    /// backend unless `session` is authenticated.
    #[instrument(skip(self, session), fields(provider = %session.provider))]
    pub async fn list_enabled_apis(
        &self,
        session: &ProviderSession,
    ) -> Result<Vec<ApiResource>, CatalogError> {
        let provider = session.provider;
        let scope_id = match session.scope_id() {
            Some(id) if session.is_authenticated() => id,
            _ => return Err(CatalogError::NotAuthenticated(provider)),
        };

        let ids = self
            .backend
            .enabled_apis(provider, scope_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "Enabled API listing failed");
                e.into_catalog_error(CATALOG_FAILED_MESSAGE)
            })?;

        let mut seen = HashSet::new();
        let apis: Vec<_> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .map(|id| ApiResource::from_canonical(provider, id))
            .collect();

        debug!(count = apis.len(), "Enabled APIs listed");
        Ok(apis)
    }
}

impl std::fmt::Debug for ApiCatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCatalogService").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
