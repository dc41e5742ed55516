//! Dashboard aggregates.

use tenantdesk_core::{
    ChartPeriod, ChartPoint, DashboardStats, RecentActivity, SystemHealth, TimeSeriesPoint,
};
use tracing::instrument;

use super::TenantdeskClient;
use crate::cache::CacheKey;
use crate::error::ApiError;
use crate::gateway::QueryParams;

const STATS_PATH: &str = "/api/dashboard/stats/";
const ACTIVITY_PATH: &str = "/api/dashboard/activity/";
const HEALTH_PATH: &str = "/api/dashboard/health/";
const REVENUE_CHART_PATH: &str = "/api/dashboard/charts/revenue/";
const ORDERS_CHART_PATH: &str = "/api/dashboard/charts/orders/";
const PRODUCTS_CHART_PATH: &str = "/api/dashboard/charts/products/";

/// Number of products the top-products chart shows by default.
pub const DEFAULT_TOP_PRODUCTS: u32 = 10;

/// Dashboard aggregates. Obtained from [`TenantdeskClient::dashboard`].
#[derive(Debug, Clone, Copy)]
pub struct DashboardApi<'a> {
    client: &'a TenantdeskClient,
}

impl<'a> DashboardApi<'a> {
    pub(super) const fn new(client: &'a TenantdeskClient) -> Self {
        Self { client }
    }

    /// Headline platform statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        self.client
            .read(&CacheKey::DashboardStats, STATS_PATH, QueryParams::new())
            .await
    }

    /// Latest orders, tenants, and storefronts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn activity(&self) -> Result<RecentActivity, ApiError> {
        self.client
            .read(&CacheKey::DashboardActivity, ACTIVITY_PATH, QueryParams::new())
            .await
    }

    /// Service health overview.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<SystemHealth, ApiError> {
        self.client
            .read(&CacheKey::DashboardHealth, HEALTH_PATH, QueryParams::new())
            .await
    }

    /// Revenue per day over `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn revenue_chart(&self, period: ChartPeriod) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        self.client
            .read(
                &CacheKey::RevenueChart(period),
                REVENUE_CHART_PATH,
                QueryParams::new().with("period", period.as_str()),
            )
            .await
    }

    /// Orders per day over `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders_chart(&self, period: ChartPeriod) -> Result<Vec<TimeSeriesPoint>, ApiError> {
        self.client
            .read(
                &CacheKey::OrdersChart(period),
                ORDERS_CHART_PATH,
                QueryParams::new().with("period", period.as_str()),
            )
            .await
    }

    /// Best-selling products, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn top_products(&self, limit: u32) -> Result<Vec<ChartPoint>, ApiError> {
        self.client
            .read(
                &CacheKey::TopProducts(limit),
                PRODUCTS_CHART_PATH,
                QueryParams::new().with("limit", limit),
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionStore;
    use serde_json::json;
    use tenantdesk_core::HealthStatus;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> TenantdeskClient {
        let config = ClientConfig::with_api_url(&server.uri()).unwrap();
        let session = SessionStore::in_memory();
        session.restore().await;
        TenantdeskClient::new(&config, session).unwrap()
    }

    #[tokio::test]
    async fn test_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STATS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_tenants": 12,
                "total_storefronts": 9,
                "total_orders": 140,
                "total_revenue": "1520.50",
                "recent_orders": 7,
                "recent_tenants": 2
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let stats = client.dashboard().stats().await.unwrap();
        assert_eq!(stats.total_tenants, 12);
        assert_eq!(stats.total_revenue.to_string(), "1520.50");
        assert!(stats.total_products.is_none());

        // Second read is served from the cache
        client.dashboard().stats().await.unwrap();
    }

    #[tokio::test]
    async fn test_health_services_map() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "services": {
                    "database": {"status": "healthy", "response_time": 12.0},
                    "cache": {"status": "warning"}
                },
                "uptime": 86400
            })))
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let health = client.dashboard().health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.services["cache"].status, "warning");
        assert_eq!(health.uptime, 86_400);
    }

    #[tokio::test]
    async fn test_charts_are_keyed_by_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(REVENUE_CHART_PATH))
            .and(query_param("period", "7d"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"date": "2024-01-01", "value": 100.0}])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(REVENUE_CHART_PATH))
            .and(query_param("period", "90d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let week = client.dashboard().revenue_chart(ChartPeriod::Week).await.unwrap();
        let quarter = client
            .dashboard()
            .revenue_chart(ChartPeriod::Quarter)
            .await
            .unwrap();
        assert_eq!(week.len(), 1);
        assert!(quarter.is_empty());
    }

    #[tokio::test]
    async fn test_top_products_sends_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PRODUCTS_CHART_PATH))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Mug", "value": 42.0, "color": "#ff0000"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let products = client.dashboard().top_products(5).await.unwrap();
        assert_eq!(products[0].name, "Mug");
    }
}
