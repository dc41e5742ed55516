//! Tenantdesk Client - API access for the administration dashboard.
//!
//! This crate talks to the remote multi-tenant e-commerce administration API
//! on behalf of an operator:
//!
//! - [`gateway`] - Authenticated HTTP gateway (base URL, bearer token, JSON, errors)
//! - [`session`] - Token store with persisted login across runs
//! - [`cache`] - Query cache keyed by resource and filters
//! - [`resources`] - Typed operations per resource kind, with cache upkeep
//! - [`guard`] - Route guard deciding what an auth state may open
//! - [`config`] - Environment-based configuration
//!
//! # Security
//!
//! The session file holds a live bearer token. It is written with owner-only
//! permissions and tokens are redacted from every `Debug` and log line.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod resources;
pub mod session;

pub use cache::{CacheEntry, CacheKey, QueryCache};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, GENERIC_ERROR_MESSAGE};
pub use gateway::{Gateway, Payload, QueryParams, RequestOptions};
pub use guard::{GuardDecision, RouteGuard};
pub use resources::{
    AuthApi, DEFAULT_TOP_PRODUCTS, DashboardApi, StorefrontFilters, StorefrontsApi, TenantFilters,
    TenantdeskClient, TenantsApi,
};
pub use session::{AuthSnapshot, AuthState, SessionError, SessionStore};
