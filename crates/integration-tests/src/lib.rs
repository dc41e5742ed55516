//! Integration tests for the Tenantdesk client.
//!
//! Every test runs the real client against a [`wiremock::MockServer`], so no
//! live API is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tenantdesk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_lifecycle` - Login, logout, 401 handling, persistence
//! - `cache_consistency` - Refetching and invalidation after mutations
//! - `request_shaping` - Query strings, headers, and error normalization

use std::path::Path;

use serde_json::{Value, json};
use tenantdesk_client::{ClientConfig, SessionStore, TenantdeskClient};
use tenantdesk_core::LoginCredentials;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Login endpoint as seen by the mock server.
pub const LOGIN_PATH: &str = "/api/auth/login/";

/// Logout endpoint as seen by the mock server.
pub const LOGOUT_PATH: &str = "/api/auth/logout/";

/// Bearer token issued by [`mount_login`].
pub const ACCESS_TOKEN: &str = "access-1";

/// A client with an in-memory session, restored and anonymous.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid API URL.
pub async fn client_for(server: &MockServer) -> TenantdeskClient {
    let config = ClientConfig::with_api_url(&server.uri()).expect("mock server uri is valid");
    let session = SessionStore::in_memory();
    session.restore().await;
    TenantdeskClient::new(&config, session).expect("client builds")
}

/// A client whose session lives in `session_file`, restored from it.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid API URL.
pub async fn file_client_for(server: &MockServer, session_file: &Path) -> TenantdeskClient {
    let mut config = ClientConfig::with_api_url(&server.uri()).expect("mock server uri is valid");
    config.session_file = session_file.to_path_buf();
    let client = TenantdeskClient::from_config(&config).expect("client builds");
    client.session().restore().await;
    client
}

/// Credentials accepted by [`mount_login`].
#[must_use]
pub fn credentials() -> LoginCredentials {
    LoginCredentials {
        email: "ops@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

/// A successful login response.
#[must_use]
pub fn login_body() -> Value {
    json!({
        "user": {"id": 1, "email": "ops@example.com", "first_name": "Ada", "last_name": "Lovelace"},
        "access": ACCESS_TOKEN,
        "refresh": "refresh-1",
        "tenants": [{"id": 4, "name": "Acme"}]
    })
}

/// Accept any login with [`login_body`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .mount(server)
        .await;
}

/// Log `client` in through the mocked login endpoint.
///
/// # Panics
///
/// Panics if the login fails.
pub async fn logged_in(server: &MockServer, client: &TenantdeskClient) {
    mount_login(server).await;
    client
        .auth()
        .login(&credentials())
        .await
        .expect("mock login succeeds");
}

/// A tenant as the API renders it.
#[must_use]
pub fn tenant_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "subdomain": name.to_lowercase(),
        "plan_type": "pro",
        "is_active": true
    })
}

/// A paginated envelope around `results`.
#[must_use]
pub fn page_json(results: Vec<Value>) -> Value {
    json!({"count": results.len(), "next": null, "previous": null, "results": results})
}

/// A storefront as the API renders it.
#[must_use]
pub fn storefront_json(id: i64, published: bool) -> Value {
    json!({
        "id": id,
        "tenant": 4,
        "store_name": "Acme Outlet",
        "is_published": published,
        "is_active": true
    })
}
