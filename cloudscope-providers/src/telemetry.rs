//! Telemetry retrieval with a synthetic series fallback.
//!
//! The aggregator issues exactly one backend request per API and never
//! calls the backend for a session that is not authenticated. When the
//! backend omits a full seven-day series, [`synthesize`] fills it in.

use std::sync::Arc;

use cloudscope_core::{
    ProviderSession, SyntheticSeries, TelemetryError, TelemetryRecord, TelemetryReport,
};
use cloudscope_fetch::{TelemetryBackend, TelemetryRequest};
use futures::future::join_all;
use tracing::{debug, instrument, warn};

/// Message when the backend fails without saying why.
pub const TELEMETRY_FAILED_MESSAGE: &str = "Failed to fetch API details";

// ============================================================================
// Telemetry Aggregator
// ============================================================================

/// Fetches billing and utilization for APIs of an authenticated session.
#[derive(Clone)]
pub struct TelemetryAggregator {
    backend: Arc<dyn TelemetryBackend>,
}

impl TelemetryAggregator {
    /// Creates an aggregator backed by `backend`.
    pub fn new(backend: Arc<dyn TelemetryBackend>) -> Self {
        Self { backend }
    }

    /// Fetches the telemetry record for `api_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::NotAuthenticated`] without a request unless
    /// `session` is authenticated, or [`TelemetryError::Fetch`] carrying the
    /// backend's message.
    pub async fn fetch_telemetry(
        &self,
        api_id: &str,
        session: &ProviderSession,
    ) -> Result<TelemetryRecord, TelemetryError> {
        self.fetch_parts(api_id, session)
            .await
            .map(|(record, _)| record)
    }

    /// Fetches a record and pairs it with a seven-day series.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_telemetry`](Self::fetch_telemetry).
    pub async fn fetch_report(
        &self,
        api_id: &str,
        session: &ProviderSession,
    ) -> Result<TelemetryReport, TelemetryError> {
        let (record, series) = self.fetch_parts(api_id, session).await?;
        let report = TelemetryReport::assemble(record, series);
        debug!(api_id, source = %report.series_source, "Report assembled");
        Ok(report)
    }

    /// Fetches reports for several APIs concurrently.
    ///
    /// Results are returned in input order, one per API.
    pub async fn fetch_many<S: AsRef<str>>(
        &self,
        api_ids: &[S],
        session: &ProviderSession,
    ) -> Vec<(String, Result<TelemetryReport, TelemetryError>)> {
        let fetches = api_ids.iter().map(|id| async move {
            let id = id.as_ref();
            (id.to_string(), self.fetch_report(id, session).await)
        });
        join_all(fetches).await
    }

    /// Generates the deterministic series for `api_id`.
    pub fn synthesize(api_id: &str) -> SyntheticSeries {
        cloudscope_core::synthesize(api_id)
    }

    #[instrument(skip(self, session), fields(provider = %session.provider))]
    async fn fetch_parts(
        &self,
        api_id: &str,
        session: &ProviderSession,
    ) -> Result<(TelemetryRecord, Option<SyntheticSeries>), TelemetryError> {
        let scope_id = match session.scope_id() {
            Some(id) if session.is_authenticated() => id,
            _ => return Err(TelemetryError::NotAuthenticated(session.provider)),
        };

        let request = TelemetryRequest::new(api_id, scope_id);
        let response = self.backend.api_details(&request).await.map_err(|e| {
            warn!(error = %e, "API details request failed");
            e.into_telemetry_error(TELEMETRY_FAILED_MESSAGE)
        })?;

        Ok(response.into_parts(api_id))
    }
}

impl std::fmt::Debug for TelemetryAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryAggregator").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
