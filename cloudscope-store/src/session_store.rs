//! Session state machine.
//!
//! ```text
//! Unauthenticated ──authenticate──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                              │                      │
//!        │                              └──err──▶ Failed        │
//!        │                                          │  ▲        │
//!        └──────────── reset / sign_out ────────────┘  └─retry──┘ (sign_out)
//! ```
//!
//! Sign-out is global: every provider returns to `Unauthenticated` and the
//! vault is wiped. Each attempt carries an id; an attempt whose id was
//! invalidated by a sign-out or reset is discarded on completion, and an
//! attempt whose future is dropped returns its provider to
//! `Unauthenticated`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use cloudscope_core::{
    AuthError, CredentialInput, ProviderAuthenticator, ProviderKind, ProviderSession,
    SessionError, SessionIdentifiers, SessionStatus,
};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::vault::CredentialVault;

// ============================================================================
// Inner State
// ============================================================================

#[derive(Default)]
struct SessionStoreInner {
    /// Sessions by provider. Missing entries are unauthenticated.
    sessions: HashMap<ProviderKind, ProviderSession>,
    /// Id of the attempt in flight, per provider.
    in_flight: HashMap<ProviderKind, u64>,
    /// Last attempt id handed out.
    last_attempt: u64,
    /// Change counter published to subscribers.
    version: u64,
}

impl SessionStoreInner {
    fn session(&self, provider: ProviderKind) -> ProviderSession {
        self.sessions
            .get(&provider)
            .cloned()
            .unwrap_or_else(|| ProviderSession::unauthenticated(provider))
    }

    fn is_current(&self, provider: ProviderKind, attempt: u64) -> bool {
        self.in_flight.get(&provider) == Some(&attempt)
    }
}

// ============================================================================
// Attempt Guard
// ============================================================================

/// Reverts an attempt whose future was dropped before it finished.
struct AttemptGuard<'a> {
    store: &'a SessionStore,
    provider: ProviderKind,
    attempt: u64,
    finished: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let (provider, attempt) = (self.provider, self.attempt);

        if let Ok(mut inner) = self.store.inner.try_write() {
            self.store.abandon(&mut inner, provider, attempt);
            return;
        }

        // The lock is busy; finish the revert on the runtime.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                handle.spawn(async move {
                    let mut inner = store.inner.write().await;
                    store.abandon(&mut inner, provider, attempt);
                });
            }
            Err(_) => {
                warn!(provider = %provider, "Cannot revert abandoned attempt outside a runtime");
            }
        }
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// Owns one session per provider and drives their transitions.
///
/// Observable via a watch channel for UI updates.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionStoreInner>>,
    vault: CredentialVault,
    notify: Arc<watch::Sender<u64>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(CredentialVault::in_memory())
    }
}

impl SessionStore {
    /// Creates a store persisting through `vault`.
    pub fn new(vault: CredentialVault) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(SessionStoreInner::default())),
            vault,
            notify: Arc::new(notify),
        }
    }

    /// Creates a store and restores persisted sessions from `vault`.
    pub async fn restored(vault: CredentialVault) -> Self {
        let store = Self::new(vault);
        store.restore().await;
        store
    }

    /// Returns the vault.
    pub fn vault(&self) -> &CredentialVault {
        &self.vault
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a snapshot of the session for `provider`.
    pub async fn session(&self, provider: ProviderKind) -> ProviderSession {
        self.inner.read().await.session(provider)
    }

    /// Returns snapshots of every provider's session, in dashboard order.
    pub async fn sessions(&self) -> Vec<ProviderSession> {
        let inner = self.inner.read().await;
        ProviderKind::all().iter().map(|p| inner.session(*p)).collect()
    }

    /// Returns the status of `provider`.
    pub async fn status(&self, provider: ProviderKind) -> SessionStatus {
        self.inner
            .read()
            .await
            .sessions
            .get(&provider)
            .map_or(SessionStatus::Unauthenticated, ProviderSession::status)
    }

    /// Returns true if `provider` is authenticated.
    pub async fn is_authenticated(&self, provider: ProviderKind) -> bool {
        self.status(provider).await == SessionStatus::Authenticated
    }

    /// Returns the session for `provider` if it is authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] otherwise.
    pub async fn require_authenticated(
        &self,
        provider: ProviderKind,
    ) -> Result<ProviderSession, SessionError> {
        let session = self.session(provider).await;
        if session.is_authenticated() {
            Ok(session)
        } else {
            Err(SessionError::NotAuthenticated(provider))
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Loads persisted sessions from the vault.
    ///
    /// Providers with an attempt in flight are left alone.
    pub async fn restore(&self) {
        let mut restored = Vec::new();
        for provider in ProviderKind::all() {
            if let Some(session) = self.vault.get(*provider).await {
                restored.push(session);
            }
        }

        let mut inner = self.inner.write().await;
        let mut count = 0;
        for session in restored {
            let provider = session.provider;
            if inner.session(provider).status() == SessionStatus::Authenticating {
                continue;
            }
            inner.sessions.insert(provider, session);
            count += 1;
        }
        if count > 0 {
            self.bump(&mut inner);
        }
        info!(count, "Sessions restored");
    }

    /// Runs `authenticator` for its provider and records the outcome.
    ///
    /// Allowed from `Unauthenticated` and `Failed`. On success the
    /// identifiers are persisted; on failure the session moves to `Failed`
    /// and the provider's persisted flags are removed.
    ///
    /// Dropping the returned future mid-attempt (a timeout, a `select!`)
    /// returns the provider to `Unauthenticated` so it can be retried.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyInProgress`] if an attempt is in flight
    /// - [`SessionError::InvalidTransition`] if already authenticated
    /// - [`SessionError::Auth`] if the input is for another provider or the
    ///   authenticator fails
    /// - [`SessionError::Superseded`] if a sign-out or reset happened meanwhile
    pub async fn authenticate<A>(
        &self,
        authenticator: &A,
        input: CredentialInput,
    ) -> Result<ProviderSession, SessionError>
    where
        A: ProviderAuthenticator,
    {
        let provider = authenticator.kind();
        if input.provider() != provider {
            return Err(AuthError::UnsupportedInput {
                expected: provider,
                got: input.provider(),
            }
            .into());
        }

        let attempt = self.begin(provider).await?;
        let mut guard = AttemptGuard {
            store: self,
            provider,
            attempt,
            finished: false,
        };
        let outcome = authenticator.authenticate(input).await;
        let result = self.finish(provider, attempt, outcome).await;
        guard.finished = true;
        result
    }

    async fn begin(&self, provider: ProviderKind) -> Result<u64, SessionError> {
        let mut inner = self.inner.write().await;
        let mut session = inner.session(provider);

        match session.status() {
            SessionStatus::Authenticating => {
                debug!(provider = %provider, "Rejecting concurrent attempt");
                return Err(SessionError::AlreadyInProgress(provider));
            }
            SessionStatus::Authenticated => {
                return Err(SessionError::InvalidTransition {
                    provider,
                    from: SessionStatus::Authenticated,
                    to: SessionStatus::Authenticating,
                });
            }
            SessionStatus::Unauthenticated | SessionStatus::Failed => {}
        }

        session.begin_authentication();
        inner.sessions.insert(provider, session);
        inner.last_attempt += 1;
        let attempt = inner.last_attempt;
        inner.in_flight.insert(provider, attempt);
        self.bump(&mut inner);
        info!(provider = %provider, attempt, "Authentication started");
        Ok(attempt)
    }

    async fn finish(
        &self,
        provider: ProviderKind,
        attempt: u64,
        outcome: Result<SessionIdentifiers, AuthError>,
    ) -> Result<ProviderSession, SessionError> {
        // Vault writes happen under the lock so they cannot interleave
        // with a sign-out.
        let mut inner = self.inner.write().await;

        if !inner.is_current(provider, attempt) {
            info!(provider = %provider, attempt, "Discarding superseded attempt");
            return Err(SessionError::Superseded(provider));
        }

        let outcome = outcome.and_then(|ids| {
            ProviderSession::authenticated(provider, ids, Utc::now()).map_err(|e| {
                AuthError::AuthFailed {
                    message: e.to_string(),
                }
            })
        });

        match outcome {
            Ok(session) => {
                self.vault
                    .set_at(provider, session.identifiers(), session.created_at)
                    .await;
                inner.sessions.insert(provider, session.clone());
                inner.in_flight.remove(&provider);
                self.bump(&mut inner);
                info!(provider = %provider, "Authenticated");
                Ok(session)
            }
            Err(err) => {
                let mut session = inner.session(provider);
                session.fail(err.to_string());
                inner.sessions.insert(provider, session);
                self.vault.clear(provider).await;
                inner.in_flight.remove(&provider);
                self.bump(&mut inner);
                warn!(provider = %provider, error = %err, local = err.is_local(), "Authentication failed");
                Err(err.into())
            }
        }
    }

    /// Returns a failed or pending session to `Unauthenticated`.
    ///
    /// A pending attempt is cancelled: its result is discarded when it
    /// completes. Other providers are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] if the session is
    /// `Authenticated`; use [`sign_out`](Self::sign_out) for that.
    pub async fn reset(&self, provider: ProviderKind) -> Result<(), SessionError> {
        let mut inner = self.inner.write().await;
        match inner.session(provider).status() {
            SessionStatus::Unauthenticated => Ok(()),
            SessionStatus::Failed | SessionStatus::Authenticating => {
                inner.sessions.remove(&provider);
                inner.in_flight.remove(&provider);
                self.bump(&mut inner);
                debug!(provider = %provider, "Session reset");
                Ok(())
            }
            from => Err(SessionError::InvalidTransition {
                provider,
                from,
                to: SessionStatus::Unauthenticated,
            }),
        }
    }

    /// Signs out of every provider and wipes the vault.
    pub async fn sign_out(&self) {
        let mut inner = self.inner.write().await;
        inner.in_flight.clear();
        inner.sessions.clear();
        self.vault.clear_all().await;
        self.bump(&mut inner);
        info!("Signed out of all providers");
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Returns the current change counter.
    pub async fn version(&self) -> u64 {
        self.inner.read().await.version
    }

    /// Returns `provider` to `Unauthenticated` if `attempt` is still the
    /// one in flight.
    fn abandon(&self, inner: &mut SessionStoreInner, provider: ProviderKind, attempt: u64) {
        if !inner.is_current(provider, attempt) {
            return;
        }
        inner.in_flight.remove(&provider);
        inner.sessions.remove(&provider);
        self.bump(inner);
        info!(provider = %provider, attempt, "Abandoned attempt reverted");
    }

    fn bump(&self, inner: &mut SessionStoreInner) {
        inner.version += 1;
        let _ = self.notify.send(inner.version);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Authenticator answering from a script, optionally after a delay.
    struct ScriptedAuthenticator {
        kind: ProviderKind,
        answer: Result<SessionIdentifiers, AuthError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedAuthenticator {
        fn ok(kind: ProviderKind, key: &str, value: &str) -> Self {
            Self {
                kind,
                answer: Ok(SessionIdentifiers::new().with(key, value)),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn err(kind: ProviderKind, err: AuthError) -> Self {
            Self {
                kind,
                answer: Err(err),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl ProviderAuthenticator for ScriptedAuthenticator {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn authenticate(
            &self,
            _input: CredentialInput,
        ) -> Result<SessionIdentifiers, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        }
    }

    fn gcp_ok() -> ScriptedAuthenticator {
        ScriptedAuthenticator::ok(ProviderKind::Gcp, "project_id", "proj-123")
    }

    fn gcp_input() -> CredentialInput {
        CredentialInput::gcp(cloudscope_core::ServiceAccountFile::new(
            "sa.json",
            b"{}".to_vec(),
        ))
    }

    #[tokio::test]
    async fn test_success_persists_identifiers() {
        let store = SessionStore::default();
        let session = store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();

        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert!(store.is_authenticated(ProviderKind::Gcp).await);
        assert!(store.vault().is_authenticated(ProviderKind::Gcp).await);
        assert_eq!(store.vault().gcp_project_id().await.as_deref(), Some("proj-123"));
    }

    #[tokio::test]
    async fn test_failure_moves_to_failed_and_clears_flags() {
        let store = SessionStore::default();
        let auth = ScriptedAuthenticator::err(
            ProviderKind::Azure,
            AuthError::InvalidCredential("Invalid secret key".into()),
        );

        let err = store
            .authenticate(&auth, CredentialInput::azure("nope"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Auth(AuthError::InvalidCredential("Invalid secret key".into()))
        );

        let session = store.session(ProviderKind::Azure).await;
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.identifiers().is_empty());
        assert_eq!(session.last_error.as_deref(), Some("Invalid secret key"));
        assert!(!store.vault().is_authenticated(ProviderKind::Azure).await);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let store = SessionStore::default();
        let failing = ScriptedAuthenticator::err(
            ProviderKind::Aws,
            AuthError::MissingField("Both Access Key and Secret Access Key are required".into()),
        );
        assert!(store
            .authenticate(&failing, CredentialInput::aws("", ""))
            .await
            .is_err());

        let ok = ScriptedAuthenticator::ok(ProviderKind::Aws, "access_key_id", "AKIA");
        store
            .authenticate(&ok, CredentialInput::aws("AKIA", "s"))
            .await
            .unwrap();
        assert!(store.is_authenticated(ProviderKind::Aws).await);
    }

    #[tokio::test]
    async fn test_authenticated_requires_sign_out_first() {
        let store = SessionStore::default();
        store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();

        let err = store.authenticate(&gcp_ok(), gcp_input()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: SessionStatus::Authenticated,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_attempt_is_rejected() {
        let store = SessionStore::default();
        let slow = gcp_ok().delayed(Duration::from_millis(100));

        let (first, second) = tokio::join!(
            store.authenticate(&slow, gcp_input()),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                store.authenticate(&slow, gcp_input()).await
            }
        );

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), SessionError::AlreadyInProgress(ProviderKind::Gcp));
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_providers_are_independent() {
        let store = SessionStore::default();
        let slow = gcp_ok().delayed(Duration::from_millis(50));
        let aws = ScriptedAuthenticator::ok(ProviderKind::Aws, "access_key_id", "AKIA");

        let (gcp, aws) = tokio::join!(
            store.authenticate(&slow, gcp_input()),
            store.authenticate(&aws, CredentialInput::aws("AKIA", "s"))
        );
        assert!(gcp.is_ok());
        assert!(aws.is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_is_global() {
        let store = SessionStore::default();
        store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();
        store.vault().set_username("Ada").await;

        store.sign_out().await;

        for provider in ProviderKind::all() {
            assert!(!store.is_authenticated(*provider).await);
            assert!(!store.vault().is_authenticated(*provider).await);
        }
        assert_eq!(store.vault().username().await, "User");
    }

    #[tokio::test]
    async fn test_sign_out_supersedes_in_flight_attempt() {
        let store = SessionStore::default();
        let slow = gcp_ok().delayed(Duration::from_millis(100));

        let (result, ()) = tokio::join!(store.authenticate(&slow, gcp_input()), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.sign_out().await;
        });

        assert_eq!(result.unwrap_err(), SessionError::Superseded(ProviderKind::Gcp));
        assert_eq!(store.status(ProviderKind::Gcp).await, SessionStatus::Unauthenticated);
        assert!(!store.vault().is_authenticated(ProviderKind::Gcp).await);
    }

    #[tokio::test]
    async fn test_timed_out_attempt_can_be_retried() {
        let store = SessionStore::default();
        let slow = gcp_ok().delayed(Duration::from_millis(200));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.authenticate(&slow, gcp_input()))
                .await;
        assert!(timed_out.is_err());
        assert_eq!(store.status(ProviderKind::Gcp).await, SessionStatus::Unauthenticated);
        assert!(!store.vault().is_authenticated(ProviderKind::Gcp).await);

        let session = store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();
        assert_eq!(session.scope_id(), Some("proj-123"));
        assert!(store.is_authenticated(ProviderKind::Gcp).await);
    }

    #[tokio::test]
    async fn test_reset_cancels_pending_attempt_only() {
        let store = SessionStore::default();
        let aws = ScriptedAuthenticator::ok(ProviderKind::Aws, "access_key_id", "AKIA");
        store
            .authenticate(&aws, CredentialInput::aws("AKIA", "s"))
            .await
            .unwrap();

        let slow = gcp_ok().delayed(Duration::from_millis(100));
        let (result, reset) = tokio::join!(store.authenticate(&slow, gcp_input()), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.reset(ProviderKind::Gcp).await
        });

        assert!(reset.is_ok());
        assert_eq!(result.unwrap_err(), SessionError::Superseded(ProviderKind::Gcp));
        assert_eq!(store.status(ProviderKind::Gcp).await, SessionStatus::Unauthenticated);
        assert!(!store.vault().is_authenticated(ProviderKind::Gcp).await);
        assert!(store.is_authenticated(ProviderKind::Aws).await);

        store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();
        assert!(store.is_authenticated(ProviderKind::Gcp).await);
    }

    #[tokio::test]
    async fn test_mismatched_input_leaves_state_alone() {
        let store = SessionStore::default();
        let err = store
            .authenticate(&gcp_ok(), CredentialInput::azure("valid-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Auth(AuthError::UnsupportedInput { .. })));
        assert_eq!(store.status(ProviderKind::Gcp).await, SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_reset_from_failed_only() {
        let store = SessionStore::default();
        store.reset(ProviderKind::Gcp).await.unwrap();

        let failing = ScriptedAuthenticator::err(
            ProviderKind::Gcp,
            AuthError::AuthFailed {
                message: "Failed to authenticate with GCP".into(),
            },
        );
        let _ = store.authenticate(&failing, gcp_input()).await;
        store.reset(ProviderKind::Gcp).await.unwrap();
        assert_eq!(store.status(ProviderKind::Gcp).await, SessionStatus::Unauthenticated);

        store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();
        assert!(store.reset(ProviderKind::Gcp).await.is_err());
    }

    #[tokio::test]
    async fn test_restore_from_vault() {
        let vault = CredentialVault::in_memory();
        vault
            .set(
                ProviderKind::Gcp,
                &SessionIdentifiers::new().with("project_id", "proj-123"),
            )
            .await;

        let store = SessionStore::restored(vault).await;
        let session = store.require_authenticated(ProviderKind::Gcp).await.unwrap();
        assert_eq!(session.scope_id(), Some("proj-123"));
        assert_eq!(
            store.require_authenticated(ProviderKind::Aws).await.unwrap_err(),
            SessionError::NotAuthenticated(ProviderKind::Aws)
        );
    }

    #[tokio::test]
    async fn test_transitions_notify_subscribers() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        store.authenticate(&gcp_ok(), gcp_input()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);

        store.sign_out().await;
        assert_eq!(*rx.borrow_and_update(), 3);
        assert_eq!(store.version().await, 3);
    }
}
