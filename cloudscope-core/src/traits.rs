//! Trait definitions for CloudScope.

use crate::error::AuthError;
use crate::models::{CredentialInput, ProviderKind, SessionIdentifiers};

/// Converts raw credential input into normalized session identifiers.
///
/// Implementors never panic or propagate transport failures as anything
/// other than an [`AuthError`]: every outcome is a typed result the session
/// state machine can record.
pub trait ProviderAuthenticator: Send + Sync {
    /// Returns the kind of provider this implementation handles.
    fn kind(&self) -> ProviderKind;

    /// Returns the display name for this provider.
    fn display_name(&self) -> &str {
        self.kind().display_name()
    }

    /// Verifies `input` and returns the identifiers of the new session.
    fn authenticate(
        &self,
        input: CredentialInput,
    ) -> impl std::future::Future<Output = Result<SessionIdentifiers, AuthError>> + Send;
}
