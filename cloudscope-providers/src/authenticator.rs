//! Closed set of provider authenticators.

use cloudscope_core::{
    AuthError, CredentialInput, ProviderAuthenticator, ProviderKind, SessionIdentifiers,
};
use cloudscope_fetch::FetchContext;

use crate::aws::AwsAuthenticator;
use crate::azure::AzureAuthenticator;
use crate::gcp::GcpAuthenticator;

/// One authenticator per provider, dispatched by a single match.
#[derive(Debug, Clone)]
pub enum Authenticator {
    /// AWS access key pair.
    Aws(AwsAuthenticator),
    /// GCP service-account file.
    Gcp(GcpAuthenticator),
    /// Azure secret key.
    Azure(AzureAuthenticator),
}

impl Authenticator {
    /// Builds the authenticator for `kind` from a fetch context.
    pub fn for_provider(kind: ProviderKind, ctx: &FetchContext) -> Self {
        match kind {
            ProviderKind::Aws => Self::Aws(AwsAuthenticator::new(ctx.settings.simulated_auth_latency)),
            ProviderKind::Gcp => Self::Gcp(GcpAuthenticator::new(ctx.auth.clone())),
            ProviderKind::Azure => Self::Azure(AzureAuthenticator::new(
                ctx.settings.azure_secret.clone(),
                ctx.settings.simulated_auth_latency,
            )),
        }
    }
}

impl ProviderAuthenticator for Authenticator {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::Aws(a) => a.kind(),
            Self::Gcp(a) => a.kind(),
            Self::Azure(a) => a.kind(),
        }
    }

    async fn authenticate(&self, input: CredentialInput) -> Result<SessionIdentifiers, AuthError> {
        match self {
            Self::Aws(a) => a.authenticate(input).await,
            Self::Gcp(a) => a.authenticate(input).await,
            Self::Azure(a) => a.authenticate(input).await,
        }
    }
}
