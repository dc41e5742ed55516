//! Resource operations: typed, cached calls per resource kind.
//!
//! [`TenantdeskClient`] ties the gateway, session store, and query cache
//! together and hands out one borrowed handle per resource kind:
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use tenantdesk_client::{ClientConfig, TenantFilters, TenantdeskClient};
//!
//! let client = TenantdeskClient::from_config(&ClientConfig::from_env()?)?;
//! client.session().restore().await;
//!
//! let page = client.tenants().list(&TenantFilters::default()).await?;
//! println!("{} tenants", page.count);
//! # Ok(())
//! # }
//! ```
//!
//! Reads go through the cache. Writes update or invalidate the affected
//! entries only after the server accepts them. Any operation answered with
//! 401 ends the session and empties the cache.

mod auth;
mod dashboard;
mod storefronts;
mod tenants;

pub use auth::AuthApi;
pub use dashboard::{DEFAULT_TOP_PRODUCTS, DashboardApi};
pub use storefronts::{StorefrontFilters, StorefrontsApi};
pub use tenants::{TenantFilters, TenantsApi};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::cache::{CacheKey, Cached, QueryCache};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::gateway::{Gateway, QueryParams};
use crate::session::SessionStore;

/// Client for the Tenantdesk administration API.
///
/// Cheap to clone; clones share the session, cache, and connection pool.
#[derive(Clone, Debug)]
pub struct TenantdeskClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    gateway: Gateway,
    session: SessionStore,
    cache: QueryCache,
}

impl TenantdeskClient {
    /// Create a client using an explicit session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let gateway = Gateway::new(config, session.clone())?;
        let cache = QueryCache::new(config.cache_capacity, config.cache_ttl);

        Ok(Self {
            inner: Arc::new(ClientInner {
                gateway,
                session,
                cache,
            }),
        })
    }

    /// Create a client whose session is persisted to `config.session_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config, SessionStore::file(config.session_file.clone()))
    }

    /// The underlying gateway, for calls outside the typed resources.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// The session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// The query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Authentication operations.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Tenant operations.
    #[must_use]
    pub const fn tenants(&self) -> TenantsApi<'_> {
        TenantsApi::new(self)
    }

    /// Storefront operations.
    #[must_use]
    pub const fn storefronts(&self) -> StorefrontsApi<'_> {
        StorefrontsApi::new(self)
    }

    /// Dashboard aggregates.
    #[must_use]
    pub const fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    /// Apply the authentication-failure policy to an operation result.
    ///
    /// A 401 moves the session to anonymous and drops every cached query;
    /// the error itself is passed through unchanged.
    pub(crate) async fn checked<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result
            && e.is_unauthorized()
        {
            warn!("API rejected session credentials, logging out");
            self.end_session().await;
        }
        result
    }

    /// Cached `GET` of `path`, subject to the authentication-failure policy.
    pub(crate) async fn read<T>(
        &self,
        key: &CacheKey,
        path: &str,
        query: QueryParams,
    ) -> Result<T, ApiError>
    where
        T: Cached + DeserializeOwned,
    {
        let gateway = self.gateway();
        let result = self
            .cache()
            .fetch(key, move || async move { gateway.get(path, query).await })
            .await;
        self.checked(result).await
    }

    /// Clear local auth state and the cache. Persistence failures are logged.
    pub(crate) async fn end_session(&self) {
        if let Err(e) = self.inner.session.logout().await {
            error!(error = %e, "Failed to clear persisted session");
        }
        self.inner.cache.clear().await;
    }
}

/// Reject ids that would not address a single record.
///
/// Blank ids collapse into the collection path. `.` and `..` survive
/// percent-encoding (`%2E` is still a dot segment) and are resolved away
/// when the URL is parsed, retargeting the request at a parent path.
pub(crate) fn require_id(kind: &str, id: &str) -> Result<(), ApiError> {
    match id.trim() {
        "" => Err(ApiError::InvalidRequest(format!("{kind} id must not be blank"))),
        "." | ".." => Err(ApiError::InvalidRequest(format!(
            "{kind} id must not be a dot segment"
        ))),
        _ => Ok(()),
    }
}

/// Percent-encode an id for use as a single path segment.
pub(crate) fn path_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
