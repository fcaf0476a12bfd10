//! GCP service-account authenticator.

use std::sync::Arc;

use cloudscope_core::models::session::PROJECT_ID;
use cloudscope_core::{
    AuthError, CredentialInput, ProviderAuthenticator, ProviderKind, SessionIdentifiers,
};
use cloudscope_fetch::AuthBackend;
use tracing::{debug, instrument, warn};

/// Message when the backend rejects the file without saying why.
pub const AUTH_FAILED_MESSAGE: &str = "Failed to authenticate with GCP";

/// Message for an empty upload.
pub const MISSING_FILE_MESSAGE: &str = "A service account file is required";

/// Exchanges a service-account file for a project id.
#[derive(Clone)]
pub struct GcpAuthenticator {
    backend: Arc<dyn AuthBackend>,
}

impl GcpAuthenticator {
    /// Creates an authenticator backed by `backend`.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }
}

impl std::fmt::Debug for GcpAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpAuthenticator").finish_non_exhaustive()
    }
}

impl ProviderAuthenticator for GcpAuthenticator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gcp
    }

    #[instrument(skip(self, input), fields(provider = "gcp"))]
    async fn authenticate(&self, input: CredentialInput) -> Result<SessionIdentifiers, AuthError> {
        let got = input.provider();
        let CredentialInput::Gcp(file) = input else {
            return Err(AuthError::UnsupportedInput {
                expected: ProviderKind::Gcp,
                got,
            });
        };

        if file.is_empty() {
            return Err(AuthError::MissingField(MISSING_FILE_MESSAGE.to_string()));
        }

        let project_id = self
            .backend
            .authenticate_service_account(&file)
            .await
            .map_err(|e| {
                warn!(error = %e, "Service account exchange failed");
                e.into_auth_error(AUTH_FAILED_MESSAGE)
            })?;

        if let Some(declared) = file.declared_project_id().filter(|d| *d != project_id) {
            debug!(%declared, resolved = %project_id, "Backend resolved a different project");
        }

        debug!(project_id = %project_id, "Service account accepted");
        Ok(SessionIdentifiers::new().with(PROJECT_ID, project_id))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cloudscope_core::ServiceAccountFile;
    use cloudscope_fetch::{FakeBackend, FakeFailure};

    fn upload() -> CredentialInput {
        CredentialInput::gcp(ServiceAccountFile::new(
            "sa.json",
            br#"{"type": "service_account", "project_id": "proj-123"}"#.to_vec(),
        ))
    }

    #[tokio::test]
    async fn test_project_id_from_backend() {
        let backend = Arc::new(FakeBackend::new().with_project("proj-123"));
        let auth = GcpAuthenticator::new(backend.clone());

        let ids = auth.authenticate(upload()).await.unwrap();
        assert_eq!(ids.project_id(), Some("proj-123"));
        assert_eq!(backend.auth_calls(), 1);
    }

    #[tokio::test]
    async fn test_rejection_message_passes_through() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_auth(Err(FakeFailure::Rejected {
            status: 400,
            message: Some("Invalid service account key".to_string()),
        }));
        let auth = GcpAuthenticator::new(backend);

        let err = auth.authenticate(upload()).await.unwrap_err();
        assert_eq!(
            err,
            AuthError::AuthFailed {
                message: "Invalid service account key".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_default() {
        let auth = GcpAuthenticator::new(Arc::new(FakeBackend::new()));
        let err = auth.authenticate(upload()).await.unwrap_err();
        assert_eq!(err.to_string(), AUTH_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_auth(Err(FakeFailure::Unreachable));
        let err = GcpAuthenticator::new(backend)
            .authenticate(upload())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[tokio::test]
    async fn test_empty_file_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::new().with_project("proj-123"));
        let auth = GcpAuthenticator::new(backend.clone());

        let err = auth
            .authenticate(CredentialInput::gcp(ServiceAccountFile::new("sa.json", Vec::new())))
            .await
            .unwrap_err();
        assert!(err.is_local());
        assert_eq!(backend.auth_calls(), 0);
    }
}
