//! Tenant operations.

use tenantdesk_core::{
    CreateTenant, Page, PlanType, Tenant, TenantId, TenantStats, TenantUpdate, TenantUsage,
};
use tracing::{info, instrument};

use super::{TenantdeskClient, path_segment, require_id};
use crate::cache::{CacheKey, ResourceKind};
use crate::error::ApiError;
use crate::gateway::QueryParams;

const COLLECTION_PATH: &str = "/tenants/";

/// Filters for [`TenantsApi::list`]. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantFilters {
    pub search: Option<String>,
    pub plan_type: Option<PlanType>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
}

impl TenantFilters {
    /// Query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("search", self.search.clone())
            .with_opt("plan_type", self.plan_type.map(|p| p.as_str()))
            .with_opt("is_active", self.is_active)
            .with_opt("page", self.page)
    }
}

/// Tenant operations. Obtained from [`TenantdeskClient::tenants`].
#[derive(Debug, Clone, Copy)]
pub struct TenantsApi<'a> {
    client: &'a TenantdeskClient,
}

impl<'a> TenantsApi<'a> {
    pub(super) const fn new(client: &'a TenantdeskClient) -> Self {
        Self { client }
    }

    /// One page of tenants matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filters: &TenantFilters) -> Result<Page<Tenant>, ApiError> {
        let query = filters.to_query();
        self.client
            .read(&CacheKey::TenantList(query.clone()), COLLECTION_PATH, query)
            .await
    }

    /// A single tenant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn get(&self, id: &TenantId) -> Result<Tenant, ApiError> {
        require_id("tenant", id.as_str())?;
        self.client
            .read(
                &CacheKey::TenantDetail(id.clone()),
                &detail_path(id),
                QueryParams::new(),
            )
            .await
    }

    /// Create a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the tenant or the request fails.
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn create(&self, data: &CreateTenant) -> Result<Tenant, ApiError> {
        let result = self.client.gateway().post(COLLECTION_PATH, Some(data)).await;
        let tenant: Tenant = self.client.checked(result).await?;

        let cache = self.client.cache();
        cache
            .set(&CacheKey::TenantDetail(tenant.id.clone()), tenant.clone())
            .await;
        cache.invalidate_lists(ResourceKind::Tenants).await;

        info!(tenant_id = %tenant.id, "Tenant created");
        Ok(tenant)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server rejects the update or the request fails.
    #[instrument(skip(self, data), fields(tenant_id = %id))]
    pub async fn update(&self, id: &TenantId, data: &TenantUpdate) -> Result<Tenant, ApiError> {
        require_id("tenant", id.as_str())?;
        let result = self.client.gateway().patch(&detail_path(id), Some(data)).await;
        let tenant: Tenant = self.client.checked(result).await?;

        let cache = self.client.cache();
        cache
            .set(&CacheKey::TenantDetail(tenant.id.clone()), tenant.clone())
            .await;
        cache.invalidate_lists(ResourceKind::Tenants).await;

        Ok(tenant)
    }

    /// Delete a tenant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn remove(&self, id: &TenantId) -> Result<(), ApiError> {
        require_id("tenant", id.as_str())?;
        let result = self.client.gateway().delete::<()>(&detail_path(id)).await;
        self.client.checked(result).await?;

        let cache = self.client.cache();
        cache.remove_subtree(&CacheKey::TenantDetail(id.clone())).await;
        cache.invalidate_lists(ResourceKind::Tenants).await;

        info!("Tenant deleted");
        Ok(())
    }

    /// Content counters for a tenant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn stats(&self, id: &TenantId) -> Result<TenantStats, ApiError> {
        require_id("tenant", id.as_str())?;
        self.client
            .read(
                &CacheKey::TenantStats(id.clone()),
                &format!("{}stats/", detail_path(id)),
                QueryParams::new(),
            )
            .await
    }

    /// Consumption against plan limits.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn usage(&self, id: &TenantId) -> Result<TenantUsage, ApiError> {
        require_id("tenant", id.as_str())?;
        self.client
            .read(
                &CacheKey::TenantUsage(id.clone()),
                &format!("{}usage/", detail_path(id)),
                QueryParams::new(),
            )
            .await
    }
}

fn detail_path(id: &TenantId) -> String {
    format!("{COLLECTION_PATH}{}/", path_segment(id.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> TenantdeskClient {
        let config = ClientConfig::with_api_url(&server.uri()).unwrap();
        let session = SessionStore::in_memory();
        session.restore().await;
        TenantdeskClient::new(&config, session).unwrap()
    }

    fn tenant_json(id: i64, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "plan_type": "pro", "is_active": true})
    }

    #[test]
    fn test_filters_drop_unset_values() {
        let filters = TenantFilters {
            search: Some("acme".to_string()),
            plan_type: Some(PlanType::Enterprise),
            ..TenantFilters::default()
        };
        assert_eq!(
            filters.to_query().canonical(),
            "plan_type=enterprise&search=acme"
        );
        assert!(TenantFilters::default().to_query().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/"))
            .and(query_param("is_active", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [tenant_json(1, "Acme")]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        let filters = TenantFilters {
            is_active: Some(true),
            ..TenantFilters::default()
        };

        let first = client.tenants().list(&filters).await.unwrap();
        let second = client.tenants().list(&filters).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.results[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_update_overwrites_detail_and_marks_lists_stale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [tenant_json(1, "Acme")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/tenants/1/"))
            .and(body_json(json!({"name": "Acme Corp"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(tenant_json(1, "Acme Corp")))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        client.tenants().list(&TenantFilters::default()).await.unwrap();

        let update = TenantUpdate {
            name: Some("Acme Corp".to_string()),
            ..TenantUpdate::default()
        };
        let id = TenantId::from(1_i64);
        client.tenants().update(&id, &update).await.unwrap();

        let cache = client.cache();
        let detail: Tenant = cache.peek(&CacheKey::TenantDetail(id)).await.unwrap();
        assert_eq!(detail.name, "Acme Corp");
        let list = cache
            .entry(&CacheKey::TenantList(QueryParams::new()))
            .await
            .unwrap();
        assert!(list.stale);
    }

    #[tokio::test]
    async fn test_remove_drops_record_and_sub_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/1/stats/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products_count": 3,
                "orders_count": 2,
                "storage_used_mb": 1.5
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/tenants/1/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        let id = TenantId::from(1_i64);

        let stats = client.tenants().stats(&id).await.unwrap();
        assert_eq!(stats.products_count, 3);

        client.tenants().remove(&id).await.unwrap();
        assert!(
            client
                .cache()
                .entry(&CacheKey::TenantStats(id))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_blank_id_is_rejected_without_request() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        let err = client.tenants().get(&TenantId::new(" ")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
