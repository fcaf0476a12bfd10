//! AWS access key authenticator.

use std::time::Duration;

use cloudscope_core::models::session::ACCESS_KEY_ID;
use cloudscope_core::{
    AuthError, CredentialInput, ProviderAuthenticator, ProviderKind, SessionIdentifiers,
};
use tracing::{debug, instrument};

/// Message for an incomplete key pair.
pub const MISSING_KEYS_MESSAGE: &str = "Both Access Key and Secret Access Key are required";

/// Accepts any non-empty access key pair after a fixed delay.
///
/// No request is made and the secret is never transmitted. A production
/// deployment replaces this with a signed STS `GetCallerIdentity` call.
#[derive(Debug, Clone)]
pub struct AwsAuthenticator {
    latency: Duration,
}

impl AwsAuthenticator {
    /// Creates an authenticator that answers after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Returns the simulated verification latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl ProviderAuthenticator for AwsAuthenticator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Aws
    }

    #[instrument(skip(self, input), fields(provider = "aws"))]
    async fn authenticate(&self, input: CredentialInput) -> Result<SessionIdentifiers, AuthError> {
        let got = input.provider();
        let CredentialInput::Aws {
            access_key_id,
            secret_access_key,
        } = input
        else {
            return Err(AuthError::UnsupportedInput {
                expected: ProviderKind::Aws,
                got,
            });
        };

        let access_key_id = access_key_id.trim();
        if access_key_id.is_empty() || secret_access_key.trim().is_empty() {
            return Err(AuthError::MissingField(MISSING_KEYS_MESSAGE.to_string()));
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!("Access key pair accepted");
        Ok(SessionIdentifiers::new().with(ACCESS_KEY_ID, access_key_id))
    }
}

// ============================================================================
// Tests
// ============================================================================
