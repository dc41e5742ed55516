//! Session store: the current bearer token and operator identity.
//!
//! # States
//!
//! - `Loading` - created, persisted state not yet read
//! - `Anonymous` - no usable session
//! - `Authenticated` - token and user held
//!
//! The store is an explicitly shared handle passed into the gateway, which
//! reads the token before every request. Only login, refresh, logout, and
//! restore change it.

mod error;
mod storage;

pub use error::SessionError;
pub use storage::{FileStorage, MemoryStorage, PersistedState, SessionDocument, SessionStorage};

use std::sync::Arc;

use secrecy::SecretString;
use tenantdesk_core::User;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token attached to every request.
    pub token: SecretString,
    /// Long-lived token used to mint new bearer tokens.
    pub refresh_token: Option<SecretString>,
    /// The operator the token belongs to.
    pub user: User,
}

/// Authentication state of the process.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

/// Point-in-time view of the auth state, as consumed by the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthSnapshot {
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl AuthSnapshot {
    /// Restoration still pending.
    pub const LOADING: Self = Self {
        is_loading: true,
        is_authenticated: false,
    };

    /// No session.
    pub const ANONYMOUS: Self = Self {
        is_loading: false,
        is_authenticated: false,
    };

    /// Session held.
    pub const AUTHENTICATED: Self = Self {
        is_loading: false,
        is_authenticated: true,
    };
}

impl From<&AuthState> for AuthSnapshot {
    fn from(state: &AuthState) -> Self {
        match state {
            AuthState::Loading => Self::LOADING,
            AuthState::Anonymous => Self::ANONYMOUS,
            AuthState::Authenticated(_) => Self::AUTHENTICATED,
        }
    }
}

/// Shared handle to the session state and its persistence.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    state: RwLock<AuthState>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store in the `Loading` state. Call [`restore`](Self::restore)
    /// to read the persisted session.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                state: RwLock::new(AuthState::Loading),
                storage,
            }),
        }
    }

    /// Store backed by the JSON file at `path`.
    #[must_use]
    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// Store that persists nothing beyond the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Rebuild the state from persistence.
    ///
    /// A missing, unreadable, or structurally invalid document restores as
    /// anonymous; the failure is logged, not returned.
    pub async fn restore(&self) -> AuthSnapshot {
        let restored = match self.inner.storage.load() {
            Ok(Some(document)) => document.into_session(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable persisted session");
                None
            }
        };

        let mut state = self.inner.state.write().await;
        *state = match restored {
            Some(session) => {
                debug!(user_id = %session.user.id, "Restored persisted session");
                AuthState::Authenticated(session)
            }
            None => AuthState::Anonymous,
        };
        AuthSnapshot::from(&*state)
    }

    /// Current auth state.
    pub async fn state(&self) -> AuthState {
        self.inner.state.read().await.clone()
    }

    /// Current auth snapshot for the route guard.
    pub async fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot::from(&*self.inner.state.read().await)
    }

    /// Whether a session is held.
    pub async fn is_authenticated(&self) -> bool {
        self.snapshot().await.is_authenticated
    }

    /// Bearer token, if authenticated.
    pub async fn token(&self) -> Option<SecretString> {
        match &*self.inner.state.read().await {
            AuthState::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// Refresh token, if authenticated and one was issued.
    pub async fn refresh_token(&self) -> Option<SecretString> {
        match &*self.inner.state.read().await {
            AuthState::Authenticated(session) => session.refresh_token.clone(),
            _ => None,
        }
    }

    /// The authenticated operator.
    pub async fn user(&self) -> Option<User> {
        match &*self.inner.state.read().await {
            AuthState::Authenticated(session) => Some(session.user.clone()),
            _ => None,
        }
    }

    /// `anonymous -> authenticated`. Replaces any existing session.
    ///
    /// The in-memory state changes even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub async fn login(
        &self,
        user: User,
        token: SecretString,
        refresh_token: Option<SecretString>,
    ) -> Result<(), SessionError> {
        let session = Session {
            token,
            refresh_token,
            user,
        };
        let document = SessionDocument::from_session(&session);

        info!(user_id = %session.user.id, "Session started");
        *self.inner.state.write().await = AuthState::Authenticated(session);

        self.inner.storage.save(&document)
    }

    /// `authenticated -> authenticated` with a new bearer token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` if there is no session, or an
    /// error if the new token cannot be persisted.
    pub async fn refresh(&self, token: SecretString) -> Result<(), SessionError> {
        let document = {
            let mut state = self.inner.state.write().await;
            let AuthState::Authenticated(session) = &mut *state else {
                return Err(SessionError::NotAuthenticated);
            };
            session.token = token;
            SessionDocument::from_session(session)
        };

        debug!("Session token refreshed");
        self.inner.storage.save(&document)
    }

    /// Replace the stored identity, keeping the tokens.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` if there is no session, or an
    /// error if the session cannot be persisted.
    pub async fn update_user(&self, user: User) -> Result<(), SessionError> {
        let document = {
            let mut state = self.inner.state.write().await;
            let AuthState::Authenticated(session) = &mut *state else {
                return Err(SessionError::NotAuthenticated);
            };
            session.user = user;
            SessionDocument::from_session(session)
        };

        self.inner.storage.save(&document)
    }

    /// `authenticated -> anonymous`.
    ///
    /// The in-memory state is cleared even if the persisted copy cannot be
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be cleared.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let was_authenticated = {
            let mut state = self.inner.state.write().await;
            let was = matches!(*state, AuthState::Authenticated(_));
            *state = AuthState::Anonymous;
            was
        };

        if was_authenticated {
            info!("Session ended");
        }

        self.inner.storage.clear()
    }
}
