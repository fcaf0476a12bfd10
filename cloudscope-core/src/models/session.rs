//! Session types.
//!
//! A session is the authenticated relationship between CloudScope and one
//! cloud provider's account or project:
//! - [`SessionStatus`] - Lifecycle state
//! - [`SessionIdentifiers`] - Provider-specific identifiers (e.g., project id)
//! - [`ProviderSession`] - One provider's session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::provider::ProviderKind;
use crate::error::CoreError;

/// Identifier key holding the GCP project id.
pub const PROJECT_ID: &str = "project_id";

/// Identifier key holding the AWS access key id.
pub const ACCESS_KEY_ID: &str = "access_key_id";

/// Identifier key holding the masked Azure secret.
pub const KEY_HINT: &str = "key_hint";

// ============================================================================
// Session Status
// ============================================================================

/// Lifecycle state of a provider session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No credentials submitted, or signed out.
    #[default]
    Unauthenticated,
    /// A credential check is in flight.
    Authenticating,
    /// Credentials were accepted.
    Authenticated,
    /// The last credential check failed.
    Failed,
}

impl SessionStatus {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Not connected",
            Self::Authenticating => "Connecting...",
            Self::Authenticated => "Connected",
            Self::Failed => "Failed",
        }
    }

    /// Returns true if a new authentication attempt may start from this state.
    pub fn can_begin_authentication(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Session Identifiers
// ============================================================================

/// Normalized provider-specific identifiers of an authenticated session.
///
/// Values are opaque strings. Keys are stable per provider (see
/// [`ProviderKind::scope_identifier`]).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentifiers(BTreeMap<String, String>);

impl SessionIdentifiers {
    /// Creates an empty identifier map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identifier, builder style. Empty values are ignored.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an identifier. Empty values are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key.into(), value);
        }
    }

    /// Gets an identifier by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the GCP project id, if present.
    pub fn project_id(&self) -> Option<&str> {
        self.get(PROJECT_ID)
    }

    /// Returns true if no identifiers are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionIdentifiers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ids = Self::new();
        for (k, v) in iter {
            ids.insert(k, v);
        }
        ids
    }
}

// ============================================================================
// Provider Session
// ============================================================================

/// The session for one provider.
///
/// Invariant: `identifiers` is non-empty iff `status` is
/// [`SessionStatus::Authenticated`]. The constructors are the only way to
/// reach each state, which keeps the invariant local to this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSession {
    /// The provider this session belongs to.
    pub provider: ProviderKind,
    status: SessionStatus,
    identifiers: SessionIdentifiers,
    /// When the session was created (first credential submission or restore).
    pub created_at: DateTime<Utc>,
    /// Message of the last failed attempt, kept for display.
    pub last_error: Option<String>,
}

impl ProviderSession {
    /// Creates an unauthenticated session.
    pub fn unauthenticated(provider: ProviderKind) -> Self {
        Self {
            provider,
            status: SessionStatus::Unauthenticated,
            identifiers: SessionIdentifiers::new(),
            created_at: Utc::now(),
            last_error: None,
        }
    }

    /// Creates an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] if `identifiers` is empty.
    pub fn authenticated(
        provider: ProviderKind,
        identifiers: SessionIdentifiers,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if identifiers.is_empty() {
            return Err(CoreError::InvalidData(format!(
                "{provider} session has no identifiers"
            )));
        }
        Ok(Self {
            provider,
            status: SessionStatus::Authenticated,
            identifiers,
            created_at,
            last_error: None,
        })
    }

    /// Moves this session into the authenticating state.
    pub fn begin_authentication(&mut self) {
        self.status = SessionStatus::Authenticating;
        self.identifiers = SessionIdentifiers::new();
        self.last_error = None;
    }

    /// Marks this session as failed with a display message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.identifiers = SessionIdentifiers::new();
        self.last_error = Some(message.into());
    }

    /// Resets this session to unauthenticated, clearing identifiers.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Unauthenticated;
        self.identifiers = SessionIdentifiers::new();
        self.last_error = None;
    }

    /// Returns the session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the session identifiers (empty unless authenticated).
    pub fn identifiers(&self) -> &SessionIdentifiers {
        &self.identifiers
    }

    /// Returns true if the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Returns the identifier used to scope backend requests.
    pub fn scope_id(&self) -> Option<&str> {
        self.identifiers.get(self.provider.scope_identifier())
    }
}

// ============================================================================
// Tests
// ============================================================================
