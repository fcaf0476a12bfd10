//! In-memory collaborator for tests and offline demos.
//!
//! [`FakeBackend`] implements all three collaborator traits from canned
//! answers and counts every call, so callers can assert that a request
//! was never made.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cloudscope_core::{ProviderKind, ServiceAccountFile};

use crate::backend::{AuthBackend, CatalogBackend, TelemetryBackend};
use crate::error::FetchError;
use crate::wire::{BillingBody, TelemetryRequest, TelemetryResponse, UtilizationBody};

/// A canned failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeFailure {
    /// Non-success status with an optional `error` message.
    Rejected {
        /// HTTP status.
        status: u16,
        /// Message in the body.
        message: Option<String>,
    },
    /// The backend is unreachable.
    Unreachable,
}

impl FakeFailure {
    fn to_error(&self) -> FetchError {
        match self {
            Self::Rejected { status, message } => FetchError::Rejected {
                status: *status,
                message: message.clone(),
            },
            Self::Unreachable => FetchError::Connection("connection refused".to_string()),
        }
    }
}

type Canned<T> = Result<T, FakeFailure>;

/// In-memory backend with call counters.
#[derive(Debug)]
pub struct FakeBackend {
    auth: Mutex<Canned<String>>,
    catalog: Mutex<Canned<Vec<String>>>,
    telemetry: Mutex<HashMap<String, Canned<TelemetryResponse>>>,
    delay: Mutex<Duration>,
    auth_calls: AtomicUsize,
    catalog_calls: AtomicUsize,
    telemetry_calls: AtomicUsize,
    last_telemetry_request: Mutex<Option<TelemetryRequest>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// Creates a backend that rejects everything until configured.
    pub fn new() -> Self {
        Self {
            auth: Mutex::new(Err(FakeFailure::Rejected {
                status: 400,
                message: None,
            })),
            catalog: Mutex::new(Ok(Vec::new())),
            telemetry: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            auth_calls: AtomicUsize::new(0),
            catalog_calls: AtomicUsize::new(0),
            telemetry_calls: AtomicUsize::new(0),
            last_telemetry_request: Mutex::new(None),
        }
    }

    /// Accepts service-account files as belonging to `project_id`.
    #[must_use]
    pub fn with_project(self, project_id: impl Into<String>) -> Self {
        self.set_auth(Ok(project_id.into()));
        self
    }

    /// Lists `apis` as enabled.
    #[must_use]
    pub fn with_apis<I, S>(self, apis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_catalog(Ok(apis.into_iter().map(Into::into).collect()));
        self
    }

    /// Answers API details for `api_id` with `response`.
    #[must_use]
    pub fn with_details(self, api_id: impl Into<String>, response: TelemetryResponse) -> Self {
        self.set_details(api_id, Ok(response));
        self
    }

    /// Delays every call by `delay`.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    /// Replaces the latency applied to every call.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = delay;
    }

    /// Replaces the service-account answer.
    pub fn set_auth(&self, answer: Canned<String>) {
        *lock(&self.auth) = answer;
    }

    /// Replaces the catalog answer.
    pub fn set_catalog(&self, answer: Canned<Vec<String>>) {
        *lock(&self.catalog) = answer;
    }

    /// Replaces the API details answer for one API.
    pub fn set_details(&self, api_id: impl Into<String>, answer: Canned<TelemetryResponse>) {
        lock(&self.telemetry).insert(api_id.into(), answer);
    }

    /// Number of service-account exchanges.
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of catalog listings.
    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Number of API details requests.
    pub fn telemetry_calls(&self) -> usize {
        self.telemetry_calls.load(Ordering::SeqCst)
    }

    /// The most recent API details request.
    pub fn last_telemetry_request(&self) -> Option<TelemetryRequest> {
        lock(&self.last_telemetry_request).clone()
    }

    /// Builds a details response with the given headline figures.
    pub fn sample_details(cost: f64, cpu_usage: f64) -> TelemetryResponse {
        TelemetryResponse {
            billing_info: BillingBody {
                cost,
                usage: cost * 10.0,
                service_name: None,
                billing_account: None,
            },
            cpu_utilization: UtilizationBody {
                cpu_usage,
                memory_usage: cpu_usage / 2.0,
                request_count: None,
                avg_latency: None,
                last_updated: None,
            },
            daily_series: None,
            status_breakdown: None,
        }
    }

    async fn pause(&self) {
        let delay = *lock(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn authenticate_service_account(
        &self,
        _file: &ServiceAccountFile,
    ) -> Result<String, FetchError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let answer = lock(&self.auth).clone();
        answer.map_err(|f| f.to_error())
    }
}

#[async_trait]
impl CatalogBackend for FakeBackend {
    async fn enabled_apis(
        &self,
        _provider: ProviderKind,
        _scope_id: &str,
    ) -> Result<Vec<String>, FetchError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let answer = lock(&self.catalog).clone();
        answer.map_err(|f| f.to_error())
    }
}

#[async_trait]
impl TelemetryBackend for FakeBackend {
    async fn api_details(
        &self,
        request: &TelemetryRequest,
    ) -> Result<TelemetryResponse, FetchError> {
        self.telemetry_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_telemetry_request) = Some(request.clone());
        self.pause().await;
        let answer = lock(&self.telemetry).get(&request.api_id).cloned();
        match answer {
            Some(answer) => answer.map_err(|f| f.to_error()),
            None => Err(FetchError::Rejected {
                status: 404,
                message: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_calls() {
        let fake = FakeBackend::new()
            .with_project("proj-123")
            .with_apis(["compute.googleapis.com"]);

        let file = ServiceAccountFile::new("sa.json", b"{}".to_vec());
        assert_eq!(fake.authenticate_service_account(&file).await.unwrap(), "proj-123");
        assert_eq!(
            fake.enabled_apis(ProviderKind::Gcp, "proj-123").await.unwrap(),
            vec!["compute.googleapis.com".to_string()]
        );
        assert_eq!(fake.auth_calls(), 1);
        assert_eq!(fake.catalog_calls(), 1);
        assert_eq!(fake.telemetry_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_api_is_not_found() {
        let fake = FakeBackend::new();
        let err = fake
            .api_details(&TelemetryRequest::new("missing", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Rejected { status: 404, .. }));
        assert_eq!(fake.last_telemetry_request().unwrap().api_id, "missing");
    }

    #[tokio::test]
    async fn test_unreachable_is_transport() {
        let fake = FakeBackend::new();
        fake.set_auth(Err(FakeFailure::Unreachable));
        let file = ServiceAccountFile::new("sa.json", b"{}".to_vec());
        let err = fake.authenticate_service_account(&file).await.unwrap_err();
        assert!(err.is_transport());
    }
}
