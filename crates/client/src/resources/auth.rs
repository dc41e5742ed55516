//! Authentication operations.

use secrecy::ExposeSecret;
use serde_json::Value;
use tenantdesk_core::{
    LoginCredentials, LoginResponse, MessageResponse, ProfileResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, User,
};
use tracing::{error, info, instrument, warn};

use super::TenantdeskClient;
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::gateway::QueryParams;
use crate::session::{AuthSnapshot, SessionError};

const LOGIN_PATH: &str = "/api/auth/login/";
const LOGOUT_PATH: &str = "/api/auth/logout/";
const REGISTER_PATH: &str = "/api/auth/register/";
const REFRESH_PATH: &str = "/api/auth/refresh/";
const PROFILE_PATH: &str = "/api/auth/me/";

/// Authentication operations. Obtained from [`TenantdeskClient::auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a TenantdeskClient,
}

impl<'a> AuthApi<'a> {
    pub(super) const fn new(client: &'a TenantdeskClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the session becomes authenticated, the cache is reset for
    /// the new identity, and the profile entry is primed with the returned
    /// user. A rejected login leaves the previous state alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .client
            .gateway()
            .post(LOGIN_PATH, Some(credentials))
            .await?;

        if let Err(e) = self
            .client
            .session()
            .login(
                response.user.clone(),
                response.access.clone().into(),
                response.refresh.clone().map(Into::into),
            )
            .await
        {
            // The in-memory session is live; it just won't survive a restart
            warn!(error = %e, "Failed to persist session");
        }

        let cache = self.client.cache();
        cache.clear().await;
        cache.set(&CacheKey::Profile, response.user.clone()).await;

        Ok(response)
    }

    /// End the session.
    ///
    /// The server is told first, but local state and the whole cache are
    /// cleared whether or not it answers.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self
            .client
            .gateway()
            .post::<Value, ()>(LOGOUT_PATH, None)
            .await
        {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }

        self.client.end_session().await;
        info!("Logged out");
    }

    /// Create an operator account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is rejected or the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.client.gateway().post(REGISTER_PATH, Some(request)).await
    }

    /// Trade the refresh token for a new bearer token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoRefreshToken` (wrapped) if no refresh token is
    /// held, or an error if the server rejects it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let session = self.client.session();
        let Some(refresh) = session.refresh_token().await else {
            return Err(SessionError::NoRefreshToken.into());
        };

        let body = RefreshRequest {
            refresh: refresh.expose_secret().to_owned(),
        };
        let result = self
            .client
            .gateway()
            .post::<RefreshResponse, _>(REFRESH_PATH, Some(&body))
            .await;
        let response = self.client.checked(result).await?;

        session.refresh(response.access.into()).await?;
        info!("Session token refreshed");
        Ok(())
    }

    /// The authenticated operator, cached.
    ///
    /// Accepts both the bare user and the `{ user, tenants }` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; a 401 also ends the session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let gateway = self.client.gateway();
        let result = self
            .client
            .cache()
            .fetch(&CacheKey::Profile, move || async move {
                let profile: ProfileResponse = gateway.get(PROFILE_PATH, QueryParams::new()).await?;
                Ok(profile.into_user())
            })
            .await;
        let user = self.client.checked(result).await?;

        if self.client.session().is_authenticated().await
            && let Err(e) = self.client.session().update_user(user.clone()).await
        {
            warn!(error = %e, "Failed to persist refreshed profile");
        }

        Ok(user)
    }

    /// Confirm the restored session against the server.
    ///
    /// - No session held: anonymous, no request
    /// - Identity fetch succeeds: authenticated
    /// - 401: the session is ended (see [`current_user`](Self::current_user))
    /// - Any other failure: reported as unauthenticated, but the persisted
    ///   session is kept so a later attempt can succeed
    #[instrument(skip(self))]
    pub async fn verify_session(&self) -> AuthSnapshot {
        let snapshot = self.client.session().snapshot().await;
        if !snapshot.is_authenticated {
            return snapshot;
        }

        match self.current_user().await {
            Ok(_) => AuthSnapshot::AUTHENTICATED,
            Err(e) => {
                if !e.is_unauthorized() {
                    error!(error = %e, "Could not verify session");
                }
                AuthSnapshot::ANONYMOUS
            }
        }
    }
}
