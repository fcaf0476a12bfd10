//! Core error types for CloudScope.
//!
//! The taxonomy follows how each failure is resolved:
//! - [`AuthError`] - Credential problems, resolved by re-submitting input
//! - [`SessionError`] - Operation attempted from the wrong session state
//! - [`CatalogError`] / [`TelemetryError`] - Backend failures after sign-in
//!
//! Collaborator messages are passed through verbatim for display. Nothing
//! here is fatal and nothing is retried automatically.

use std::fmt;
use thiserror::Error;

use crate::models::{ProviderKind, SessionStatus};

/// Core error type for CloudScope operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider not found or not supported.
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Authentication
// ============================================================================

/// Failure of a provider authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A required field was empty. Never reaches the network.
    #[error("{0}")]
    MissingField(String),

    /// The collaborator rejected the credential.
    #[error("{0}")]
    InvalidCredential(String),

    /// The collaborator refused to authenticate.
    #[error("{message}")]
    AuthFailed {
        /// Message reported by the collaborator.
        message: String,
    },

    /// The collaborator could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The input does not match the authenticator's provider.
    #[error("{expected} cannot accept {got} credentials")]
    UnsupportedInput {
        /// Provider of the authenticator.
        expected: ProviderKind,
        /// Provider the input was built for.
        got: ProviderKind,
    },
}

impl AuthError {
    /// Returns true if the error was raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::UnsupportedInput { .. })
    }
}

// ============================================================================
// Session
// ============================================================================

/// Failure of a session state machine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The operation requires an authenticated session.
    #[error("Not authenticated with {0}. Please upload credentials first.")]
    NotAuthenticated(ProviderKind),

    /// An attempt for this provider is already in flight.
    #[error("Authentication with {0} is already in progress")]
    AlreadyInProgress(ProviderKind),

    /// The transition is not allowed from the current state.
    #[error("{provider}: cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Provider of the session.
        provider: ProviderKind,
        /// Current state.
        from: SessionStatus,
        /// Requested state.
        to: SessionStatus,
    },

    /// The attempt was invalidated by a sign-out while in flight.
    #[error("Authentication with {0} was cancelled by sign-out")]
    Superseded(ProviderKind),

    /// The authenticator failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

// ============================================================================
// Backend Fetches
// ============================================================================

/// Classifies a failed backend fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    /// The backend could not be reached.
    Transport,
    /// The request timed out.
    Timeout,
    /// The backend answered with a non-success status.
    Server(u16),
    /// The backend answered with an unreadable body.
    InvalidResponse,
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("transport"),
            Self::Timeout => f.write_str("timeout"),
            Self::Server(status) => write!(f, "http_{status}"),
            Self::InvalidResponse => f.write_str("invalid_response"),
        }
    }
}

/// Failure listing enabled APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The session is not authenticated. No request was made.
    #[error("Not authenticated with {0}. Please upload credentials first.")]
    NotAuthenticated(ProviderKind),

    /// The backend failed.
    #[error("{message}")]
    Fetch {
        /// Failure class.
        code: FetchErrorCode,
        /// Display message.
        message: String,
    },
}

/// Failure fetching telemetry for an API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// The session is not authenticated. No request was made.
    #[error("Not authenticated with {0}. Please upload credentials first.")]
    NotAuthenticated(ProviderKind),

    /// The backend failed.
    #[error("{message}")]
    Fetch {
        /// Failure class.
        code: FetchErrorCode,
        /// Display message.
        message: String,
    },
}

impl TelemetryError {
    /// Returns the failure class, if the backend was involved.
    pub fn code(&self) -> Option<FetchErrorCode> {
        match self {
            Self::NotAuthenticated(_) => None,
            Self::Fetch { code, .. } => Some(*code),
        }
    }
}
