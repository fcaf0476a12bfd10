//! Azure secret key authenticator.

use std::time::Duration;

use cloudscope_core::models::session::KEY_HINT;
use cloudscope_core::{
    AuthError, CredentialInput, ProviderAuthenticator, ProviderKind, SessionIdentifiers,
};
use tracing::{debug, instrument};

/// Message for an empty secret.
pub const MISSING_SECRET_MESSAGE: &str = "Secret Key is required";

/// Message for a secret that does not match.
pub const INVALID_SECRET_MESSAGE: &str = "Invalid secret key";

const HINT_VISIBLE_CHARS: usize = 4;

/// Checks the secret key against a configured value.
///
/// A production deployment replaces this with an Azure AD token exchange.
#[derive(Clone)]
pub struct AzureAuthenticator {
    expected_secret: String,
    latency: Duration,
}

impl AzureAuthenticator {
    /// Creates an authenticator accepting `expected_secret` after `latency`.
    pub fn new(expected_secret: impl Into<String>, latency: Duration) -> Self {
        Self {
            expected_secret: expected_secret.into(),
            latency,
        }
    }
}

impl std::fmt::Debug for AzureAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureAuthenticator")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

/// Masks a secret down to its last four characters.
///
/// Secrets of four characters or fewer are masked entirely.
pub fn key_hint(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= HINT_VISIBLE_CHARS {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - HINT_VISIBLE_CHARS).collect();
    format!("****{tail}")
}

impl ProviderAuthenticator for AzureAuthenticator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    #[instrument(skip(self, input), fields(provider = "azure"))]
    async fn authenticate(&self, input: CredentialInput) -> Result<SessionIdentifiers, AuthError> {
        let got = input.provider();
        let CredentialInput::Azure { secret } = input else {
            return Err(AuthError::UnsupportedInput {
                expected: ProviderKind::Azure,
                got,
            });
        };

        if secret.trim().is_empty() {
            return Err(AuthError::MissingField(MISSING_SECRET_MESSAGE.to_string()));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if secret != self.expected_secret {
            debug!("Secret key rejected");
            return Err(AuthError::InvalidCredential(INVALID_SECRET_MESSAGE.to_string()));
        }

        Ok(SessionIdentifiers::new().with(KEY_HINT, key_hint(&secret)))
    }
}

// ============================================================================
// Tests
// ============================================================================
