//! Fetch error types.

use cloudscope_core::{AuthError, CatalogError, FetchErrorCode, TelemetryError};
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for collaborator calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The collaborator could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The collaborator answered with a non-success status.
    #[error("{}", message.as_deref().unwrap_or("Request rejected"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },

    /// Invalid response from the collaborator.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns the message the collaborator reported, if any.
    pub fn collaborator_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the collaborator was never reached.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_status() && !e.is_decode(),
            Self::Timeout(_)
            | Self::Connection(_)
            | Self::DomainNotAllowed(_)
            | Self::InvalidUrl(_) => true,
            Self::Rejected { .. } | Self::InvalidResponse(_) | Self::Json(_) => false,
        }
    }

    /// Classifies this error.
    pub fn code(&self) -> FetchErrorCode {
        match self {
            Self::Timeout(_) => FetchErrorCode::Timeout,
            Self::Http(e) if e.is_timeout() => FetchErrorCode::Timeout,
            Self::Rejected { status, .. } => FetchErrorCode::Server(*status),
            Self::InvalidResponse(_) | Self::Json(_) => FetchErrorCode::InvalidResponse,
            Self::Http(e) if e.is_decode() => FetchErrorCode::InvalidResponse,
            Self::Http(e) => e
                .status()
                .map_or(FetchErrorCode::Transport, |s| FetchErrorCode::Server(s.as_u16())),
            Self::Connection(_) | Self::DomainNotAllowed(_) | Self::InvalidUrl(_) => {
                FetchErrorCode::Transport
            }
        }
    }

    /// Converts into a telemetry error, falling back to `default_message`
    /// when the collaborator did not report one.
    pub fn into_telemetry_error(self, default_message: &str) -> TelemetryError {
        let code = self.code();
        let message = self
            .collaborator_message()
            .unwrap_or(default_message)
            .to_string();
        TelemetryError::Fetch { code, message }
    }

    /// Converts into a catalog error, falling back to `default_message`
    /// when the collaborator did not report one.
    pub fn into_catalog_error(self, default_message: &str) -> CatalogError {
        let code = self.code();
        let message = self
            .collaborator_message()
            .unwrap_or(default_message)
            .to_string();
        CatalogError::Fetch { code, message }
    }

    /// Converts into an authentication error.
    ///
    /// Transport failures become [`AuthError::Transport`]; everything else is
    /// a rejection carrying the collaborator's message or `default_message`.
    pub fn into_auth_error(self, default_message: &str) -> AuthError {
        if self.is_transport() {
            return AuthError::Transport(self.to_string());
        }
        AuthError::AuthFailed {
            message: self
                .collaborator_message()
                .unwrap_or(default_message)
                .to_string(),
        }
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => Self::Http(e),
            HttpError::DomainNotAllowed(d) => Self::DomainNotAllowed(d),
            HttpError::InvalidUrl(u) => Self::InvalidUrl(u),
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_with_message_passes_through() {
        let err = FetchError::Rejected {
            status: 400,
            message: Some("Invalid credentials file".to_string()),
        };
        assert_eq!(err.code(), FetchErrorCode::Server(400));
        assert!(!err.is_transport());

        match err.into_auth_error("Failed to authenticate with GCP") {
            AuthError::AuthFailed { message } => assert_eq!(message, "Invalid credentials file"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_without_message_uses_default() {
        let err = FetchError::Rejected {
            status: 500,
            message: None,
        };
        let telemetry = err.into_telemetry_error("Failed to fetch API details");
        assert_eq!(telemetry.to_string(), "Failed to fetch API details");
        assert_eq!(telemetry.code(), Some(FetchErrorCode::Server(500)));
    }

    #[test]
    fn test_connection_is_transport() {
        let err = FetchError::Connection("refused".to_string());
        assert!(err.is_transport());
        assert!(matches!(
            err.into_auth_error("ignored"),
            AuthError::Transport(_)
        ));
    }

    #[test]
    fn test_timeout_code() {
        assert_eq!(FetchError::Timeout(30).code(), FetchErrorCode::Timeout);
        let catalog = FetchError::Timeout(30).into_catalog_error("Failed to list APIs");
        assert_eq!(catalog.to_string(), "Failed to list APIs");
    }
}
