//! What goes over the wire and how failures come back.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use tenantdesk_client::{
    ApiError, ClientConfig, GENERIC_ERROR_MESSAGE, QueryParams, SessionStore, StorefrontFilters,
    TenantFilters, TenantdeskClient,
};
use tenantdesk_core::{PlanType, StorefrontId, TenantId, TenantUpdate};
use tenantdesk_integration_tests::{client_for, logged_in, page_json, tenant_json};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_query_string_omits_unset_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![])))
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;

    let filters = TenantFilters {
        search: Some("acme".to_string()),
        plan_type: Some(PlanType::Pro),
        ..TenantFilters::default()
    };
    client.tenants().list(&filters).await.unwrap();
    client.tenants().list(&TenantFilters::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let queries: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/tenants/")
        .map(|r| r.url.query().map(str::to_owned))
        .collect();
    assert_eq!(
        queries,
        vec![Some("plan_type=pro&search=acme".to_string()), None]
    );
}

#[tokio::test]
async fn test_storefront_filters_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storefronts/"))
        .and(query_param("tenant", "4"))
        .and(query_param("is_published", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![])))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;

    let filters = StorefrontFilters {
        tenant: Some(TenantId::from(4_i64)),
        is_published: Some(true),
        ..StorefrontFilters::default()
    };
    let page = client.storefronts().list(&filters).await.unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_partial_update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/tenants/1/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"is_active": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(tenant_json(1, "Acme")))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;

    let update = TenantUpdate {
        is_active: Some(false),
        ..TenantUpdate::default()
    };
    client
        .tenants()
        .update(&TenantId::from(1_i64), &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_malformed_error_body_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storefronts/9/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;

    let err = client
        .storefronts()
        .get(&StorefrontId::from(9_i64))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    // Not an auth failure, so the session survives
    assert!(client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_error_detail_surfaces_to_operator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/77/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    logged_in(&server, &client).await;

    let err = client.tenants().get(&TenantId::from(77_i64)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Not found.");
}

#[tokio::test]
async fn test_blank_id_rejected_before_request() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;

    let err = client.tenants().get(&TenantId::from("  ")).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dot_segment_ids_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let client = client_for(&server).await;

    for id in [".", ".."] {
        let err = client.tenants().remove(&TenantId::new(id)).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "tenant {id:?}");

        let err = client
            .storefronts()
            .publish(&StorefrontId::new(id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "storefront {id:?}");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::with_api_url(&format!("http://{addr}")).unwrap();
    let client = TenantdeskClient::new(&config, SessionStore::in_memory()).unwrap();

    let err = client.dashboard().stats().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_gateway_passthrough_for_untyped_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/charts/products/"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Mug", "value": 12.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server).await;

    let body: serde_json::Value = client
        .gateway()
        .get(
            "/api/dashboard/charts/products/",
            QueryParams::new().with("limit", 3_u32),
        )
        .await
        .unwrap();
    assert_eq!(body[0]["name"], "Mug");
}
