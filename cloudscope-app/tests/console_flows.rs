//! End-to-end console scenarios against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use cloudscope_app::CloudConsole;
use cloudscope_core::{
    AuthError, CatalogError, CredentialInput, ProviderKind, SeriesSource, ServiceAccountFile,
    SessionError, SessionStatus, TelemetryError,
};
use cloudscope_fetch::{FakeBackend, FakeFailure, FetchContext};
use cloudscope_store::{CredentialVault, JsonFileStorage};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn service_account() -> CredentialInput {
    CredentialInput::gcp(ServiceAccountFile::new(
        "service-account.json",
        br#"{"type":"service_account","project_id":"proj-123"}"#.to_vec(),
    ))
}

fn gcp_backend() -> FakeBackend {
    FakeBackend::new()
        .with_project("proj-123")
        .with_apis(["compute.googleapis.com", "storage.googleapis.com"])
        .with_details(
            "compute.googleapis.com",
            FakeBackend::sample_details(42.0, 63.5),
        )
}

async fn console_with(backend: Arc<FakeBackend>, vault: CredentialVault) -> CloudConsole {
    let ctx = FetchContext::builder()
        .backend(backend)
        .auth_latency(Duration::from_millis(10))
        .build()
        .unwrap();
    CloudConsole::with_context(ctx, vault).await
}

async fn console(backend: Arc<FakeBackend>) -> CloudConsole {
    console_with(backend, CredentialVault::in_memory()).await
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_gcp_sign_in_catalog_and_telemetry() {
    let backend = Arc::new(gcp_backend());
    let console = console(backend.clone()).await;

    let session = console.authenticate(service_account()).await.unwrap();
    assert_eq!(session.scope_id(), Some("proj-123"));
    assert_eq!(console.gcp_project_id().await.as_deref(), Some("proj-123"));

    let apis = console.list_enabled_apis(ProviderKind::Gcp).await.unwrap();
    let names: Vec<_> = apis.iter().map(|a| a.display_name.as_str()).collect();
    assert_eq!(names, ["Compute", "Storage"]);

    let report = console
        .fetch_report(ProviderKind::Gcp, "compute.googleapis.com")
        .await
        .unwrap();
    assert!((report.record.billing.cost - 42.0).abs() < f64::EPSILON);
    assert_eq!(report.series_source, SeriesSource::Synthetic);
    assert_eq!(report.series.days[0].cpu, 72);

    let request = backend.last_telemetry_request().unwrap();
    assert_eq!(request.api_id, "compute.googleapis.com");
    assert_eq!(request.project_id, "proj-123");
}

#[tokio::test]
async fn test_gcp_rejection_passes_message_through() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_auth(Err(FakeFailure::Rejected {
        status: 401,
        message: Some("Invalid service account".into()),
    }));
    let console = console(backend).await;

    let err = console.authenticate(service_account()).await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Auth(AuthError::AuthFailed {
            message: "Invalid service account".into()
        })
    );
    assert_eq!(
        console.session(ProviderKind::Gcp).await.status(),
        SessionStatus::Failed
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_auth(Err(FakeFailure::Unreachable));
    let console = console(backend).await;

    let err = console.authenticate(service_account()).await.unwrap_err();
    assert!(matches!(err, SessionError::Auth(AuthError::Transport(_))));
}

#[tokio::test]
async fn test_signed_out_reads_make_no_request() {
    let backend = Arc::new(gcp_backend());
    let console = console(backend.clone()).await;

    assert_eq!(
        console.list_enabled_apis(ProviderKind::Gcp).await.unwrap_err(),
        CatalogError::NotAuthenticated(ProviderKind::Gcp)
    );
    let err = console
        .fetch_report(ProviderKind::Gcp, "compute.googleapis.com")
        .await
        .unwrap_err();
    assert_eq!(err, TelemetryError::NotAuthenticated(ProviderKind::Gcp));
    assert_eq!(
        err.to_string(),
        "Not authenticated with GCP. Please upload credentials first."
    );

    assert_eq!(backend.catalog_calls(), 0);
    assert_eq!(backend.telemetry_calls(), 0);
}

#[tokio::test]
async fn test_sign_out_is_global() {
    let backend = Arc::new(gcp_backend());
    let console = console(backend).await;

    console.authenticate(service_account()).await.unwrap();
    console
        .authenticate(CredentialInput::aws("AKIAEXAMPLE", "secret"))
        .await
        .unwrap();
    console
        .authenticate(CredentialInput::azure("valid-key"))
        .await
        .unwrap();
    assert!(console.provider_overview().await.iter().all(|c| c.is_authenticated()));

    console.sign_out().await;

    assert!(console.provider_overview().await.iter().all(|c| !c.is_authenticated()));
    assert_eq!(console.gcp_project_id().await, None);
}

#[tokio::test]
async fn test_double_submit_is_rejected() {
    let backend = Arc::new(gcp_backend().with_delay(Duration::from_millis(100)));
    let console = console(backend.clone()).await;

    let (first, second) = tokio::join!(console.authenticate(service_account()), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        console.authenticate(service_account()).await
    });

    assert!(first.is_ok());
    assert_eq!(
        second.unwrap_err(),
        SessionError::AlreadyInProgress(ProviderKind::Gcp)
    );
    assert_eq!(backend.auth_calls(), 1);
}

#[tokio::test]
async fn test_sign_out_cancels_in_flight_sign_in() {
    let backend = Arc::new(gcp_backend().with_delay(Duration::from_millis(100)));
    let console = console(backend).await;

    let (result, ()) = tokio::join!(console.authenticate(service_account()), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        console.sign_out().await;
    });

    assert_eq!(
        result.unwrap_err(),
        SessionError::Superseded(ProviderKind::Gcp)
    );
    assert!(!console.sessions().is_authenticated(ProviderKind::Gcp).await);
    assert_eq!(console.gcp_project_id().await, None);
}

#[tokio::test]
async fn test_abandoned_sign_in_can_be_retried() {
    let backend = Arc::new(gcp_backend().with_delay(Duration::from_millis(200)));
    let console = console(backend.clone()).await;
    console
        .authenticate(CredentialInput::azure("valid-key"))
        .await
        .unwrap();

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), console.authenticate(service_account()))
            .await;
    assert!(abandoned.is_err());
    assert_eq!(
        console.session(ProviderKind::Gcp).await.status(),
        SessionStatus::Unauthenticated
    );

    backend.set_delay(Duration::ZERO);
    let session = console.authenticate(service_account()).await.unwrap();
    assert_eq!(session.scope_id(), Some("proj-123"));
    assert!(console.sessions().is_authenticated(ProviderKind::Azure).await);
}

#[tokio::test]
async fn test_azure_wrong_secret_then_retry() {
    let console = console(Arc::new(FakeBackend::new())).await;

    let err = console
        .authenticate(CredentialInput::azure("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid secret key");

    let session = console
        .authenticate(CredentialInput::azure("valid-key"))
        .await
        .unwrap();
    assert_eq!(session.scope_id(), Some("****-key"));
}

#[tokio::test]
async fn test_sessions_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session_flags.json");
    let backend = Arc::new(gcp_backend());

    {
        let vault = CredentialVault::new(Arc::new(JsonFileStorage::open(&path).await));
        let console = console_with(backend.clone(), vault).await;
        console.authenticate(service_account()).await.unwrap();
    }

    let vault = CredentialVault::new(Arc::new(JsonFileStorage::open(&path).await));
    let console = console_with(backend.clone(), vault).await;
    let apis = console.list_enabled_apis(ProviderKind::Gcp).await.unwrap();
    assert_eq!(apis.len(), 2);
    assert_eq!(backend.auth_calls(), 1);
}

#[tokio::test]
async fn test_fetch_many_reports_per_api() {
    let backend = Arc::new(gcp_backend());
    let console = console(backend).await;
    console.authenticate(service_account()).await.unwrap();

    let results = console
        .fetch_many(
            ProviderKind::Gcp,
            &["compute.googleapis.com", "storage.googleapis.com"],
        )
        .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].1.is_ok());
    assert!(matches!(
        results[1].1,
        Err(TelemetryError::Fetch { .. })
    ));
}
