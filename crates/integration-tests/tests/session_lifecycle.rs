//! Session lifecycle against a mock API: login, logout, rejection, and
//! persistence across client instances.

#![allow(clippy::unwrap_used)]

use secrecy::ExposeSecret;
use serde_json::json;
use tenantdesk_client::guard::{DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH};
use tenantdesk_client::{AuthSnapshot, CacheKey, GuardDecision, RouteGuard, TenantFilters};
use tenantdesk_core::TenantId;
use tenantdesk_integration_tests::{
    ACCESS_TOKEN, LOGOUT_PATH, client_for, file_client_for, logged_in, page_json, tenant_json,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_tenant_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/tenants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![tenant_json(
            1, "Acme",
        )])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bearer_sent_only_while_logged_in() {
    let server = MockServer::start().await;
    mount_tenant_list(&server).await;
    Mock::given(method("POST"))
        .and(path(LOGOUT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;
    let client = client_for(&server).await;

    logged_in(&server, &client).await;
    client.tenants().list(&TenantFilters::default()).await.unwrap();

    client.auth().logout().await;
    // Cache was cleared by logout, so this goes back to the server
    client.tenants().list(&TenantFilters::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let lists: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/tenants/")
        .collect();
    assert_eq!(lists.len(), 2);

    let first = lists.first().unwrap();
    assert_eq!(
        first.headers.get("authorization").unwrap().to_str().unwrap(),
        format!("Bearer {ACCESS_TOKEN}")
    );
    let last = lists.last().unwrap();
    assert!(last.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_response_ends_session_and_clears_cache() {
    let server = MockServer::start().await;
    mount_tenant_list(&server).await;
    Mock::given(method("GET"))
        .and(path("/tenants/1/stats/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Given token not valid for any token type"})),
        )
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;
    client.tenants().list(&TenantFilters::default()).await.unwrap();

    let err = client.tenants().stats(&TenantId::from(1_i64)).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Given token not valid for any token type");
    assert_eq!(client.session().snapshot().await, AuthSnapshot::ANONYMOUS);
    assert!(client.session().token().await.is_none());
    assert!(client.cache().entry(&CacheKey::Profile).await.is_none());
    assert!(
        client
            .cache()
            .entry(&CacheKey::TenantList(TenantFilters::default().to_query()))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_file_session_survives_new_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "email": "ops@example.com",
            "first_name": "Ada"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let first = file_client_for(&server, &session_file).await;
    assert_eq!(first.session().snapshot().await, AuthSnapshot::ANONYMOUS);
    logged_in(&server, &first).await;
    assert!(session_file.exists());

    let second = file_client_for(&server, &session_file).await;
    assert_eq!(second.session().snapshot().await, AuthSnapshot::AUTHENTICATED);
    assert_eq!(
        second.session().token().await.unwrap().expose_secret(),
        ACCESS_TOKEN
    );
    assert_eq!(second.auth().verify_session().await, AuthSnapshot::AUTHENTICATED);
}

#[tokio::test]
async fn test_corrupt_session_file_restores_anonymous() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    std::fs::write(&session_file, "{not json").unwrap();

    let client = file_client_for(&server, &session_file).await;

    assert_eq!(client.session().snapshot().await, AuthSnapshot::ANONYMOUS);
    assert_eq!(client.auth().verify_session().await, AuthSnapshot::ANONYMOUS);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_restored_session_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let first = file_client_for(&server, &session_file).await;
    logged_in(&server, &first).await;

    let second = file_client_for(&server, &session_file).await;
    assert_eq!(second.auth().verify_session().await, AuthSnapshot::ANONYMOUS);

    let third = file_client_for(&server, &session_file).await;
    assert_eq!(third.session().snapshot().await, AuthSnapshot::ANONYMOUS);
}

#[tokio::test]
async fn test_server_error_during_verify_keeps_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let first = file_client_for(&server, &session_file).await;
    logged_in(&server, &first).await;

    let second = file_client_for(&server, &session_file).await;
    assert_eq!(second.auth().verify_session().await, AuthSnapshot::ANONYMOUS);

    let third = file_client_for(&server, &session_file).await;
    assert_eq!(third.session().snapshot().await, AuthSnapshot::AUTHENTICATED);
}

#[tokio::test]
async fn test_guard_follows_session() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;
    let guard = RouteGuard::default();

    let snapshot = client.session().snapshot().await;
    assert_eq!(
        guard.decide(snapshot, true),
        GuardDecision::RedirectToLogin(DEFAULT_LOGIN_PATH.to_string())
    );
    assert_eq!(guard.decide(snapshot, false), GuardDecision::Render);

    logged_in(&server, &client).await;
    let snapshot = client.session().snapshot().await;
    assert_eq!(guard.decide(snapshot, true), GuardDecision::Render);
    assert_eq!(
        guard.decide(snapshot, false),
        GuardDecision::RedirectToLanding(DEFAULT_LANDING_PATH.to_string())
    );
}
