//! HTTP implementation of the collaborator traits.

use async_trait::async_trait;
use cloudscope_core::{ProviderKind, ServiceAccountFile};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::backend::{AuthBackend, CatalogBackend, TelemetryBackend};
use crate::context::FetchSettings;
use crate::error::{FetchError, HttpError};
use crate::host::HttpClient;
use crate::wire::{
    EnabledApisRequest, EnabledApisResponse, ErrorBody, GcpAuthResponse, TelemetryRequest,
    TelemetryResponse,
};

/// GCP service-account exchange endpoint.
pub const AUTHENTICATE_GCP_PATH: &str = "authenticate-gcp";

/// API details endpoint.
pub const API_DETAILS_PATH: &str = "api-details";

/// Enabled APIs endpoint.
pub const ENABLED_APIS_PATH: &str = "enabled-apis";

// ============================================================================
// Remote Backend
// ============================================================================

/// Talks to the `CloudScope` backend over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: HttpClient,
    base_url: Url,
}

impl RemoteBackend {
    /// Creates a backend client from settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut http = HttpClient::with_timeout(settings.timeout);
        if let Some(domains) = &settings.allowed_domains {
            http = http.allow_domains(domains.clone());
        }
        Self::with_client(http, &settings.backend_url)
    }

    /// Creates a backend client with a preconfigured HTTP client.
    pub fn with_client(http: HttpClient, base_url: &str) -> Result<Self, FetchError> {
        // A trailing slash keeps `Url::join` from replacing the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }

    fn map_send_error(&self, err: HttpError) -> FetchError {
        match err {
            HttpError::Request(e) if e.is_timeout() => {
                FetchError::Timeout(self.http.timeout().as_secs())
            }
            HttpError::Request(e) if e.is_connect() => FetchError::Connection(e.to_string()),
            other => other.into(),
        }
    }
}

/// Reads a JSON body, turning non-success statuses into [`FetchError::Rejected`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(rejected(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, "Unreadable response body");
        FetchError::InvalidResponse(e.to_string())
    })
}

fn rejected(status: StatusCode, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error);
    debug!(status = %status, has_message = message.is_some(), "Request rejected");
    FetchError::Rejected {
        status: status.as_u16(),
        message,
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

#[async_trait]
impl AuthBackend for RemoteBackend {
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    async fn authenticate_service_account(
        &self,
        file: &ServiceAccountFile,
    ) -> Result<String, FetchError> {
        let url = self.endpoint(AUTHENTICATE_GCP_PATH)?;
        let part = Part::bytes(file.contents.clone())
            .file_name(file.file_name.clone())
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post_multipart(url.as_str(), form)
            .await
            .map_err(|e| self.map_send_error(e))?;
        let body: GcpAuthResponse = read_json(response).await?;

        match body.project_id.filter(|id| !id.trim().is_empty()) {
            Some(project_id) => Ok(project_id),
            None => Err(FetchError::Rejected {
                status: StatusCode::OK.as_u16(),
                message: body.error,
            }),
        }
    }
}

#[async_trait]
impl CatalogBackend for RemoteBackend {
    #[instrument(skip(self))]
    async fn enabled_apis(
        &self,
        provider: ProviderKind,
        scope_id: &str,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(ENABLED_APIS_PATH)?;
        let request = EnabledApisRequest {
            provider,
            project_id: scope_id.to_string(),
        };

        let response = self
            .http
            .post_json(url.as_str(), &request)
            .await
            .map_err(|e| self.map_send_error(e))?;
        let body: EnabledApisResponse = read_json(response).await?;
        debug!(count = body.apis.len(), "Enabled APIs listed");
        Ok(body.apis)
    }
}

#[async_trait]
impl TelemetryBackend for RemoteBackend {
    #[instrument(skip(self), fields(api = %request.api_id))]
    async fn api_details(
        &self,
        request: &TelemetryRequest,
    ) -> Result<TelemetryResponse, FetchError> {
        let url = self.endpoint(API_DETAILS_PATH)?;
        let response = self
            .http
            .post_json(url.as_str(), request)
            .await
            .map_err(|e| self.map_send_error(e))?;
        read_json(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> RemoteBackend {
        RemoteBackend::with_client(HttpClient::new(), base).unwrap()
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let backend = backend("http://localhost:5000");
        assert_eq!(
            backend.endpoint(API_DETAILS_PATH).unwrap().as_str(),
            "http://localhost:5000/api-details"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = backend("https://example.com/cloudscope");
        assert_eq!(
            backend.endpoint(AUTHENTICATE_GCP_PATH).unwrap().as_str(),
            "https://example.com/cloudscope/authenticate-gcp"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RemoteBackend::with_client(HttpClient::new(), "not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejected_reads_error_body() {
        let err = rejected(StatusCode::BAD_REQUEST, r#"{"error": "Invalid service account"}"#);
        assert_eq!(err.collaborator_message(), Some("Invalid service account"));

        let err = rejected(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.collaborator_message().is_none());
    }

    #[tokio::test]
    async fn test_disallowed_domain_is_not_contacted() {
        let settings = FetchSettings {
            backend_url: "https://evil.com".to_string(),
            allowed_domains: Some(vec!["localhost".to_string()]),
            ..FetchSettings::default()
        };
        let backend = RemoteBackend::new(&settings).unwrap();
        let err = backend
            .api_details(&TelemetryRequest::new("x", "y"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DomainNotAllowed(_)));
        assert!(err.is_transport());
    }
}
