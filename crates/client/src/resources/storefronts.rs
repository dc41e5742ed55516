//! Storefront operations, including publishing, theme, and settings.

use tenantdesk_core::{
    CreateStorefront, Page, PublishResponse, SettingsUpdate, Storefront, StorefrontId,
    StorefrontSettings, StorefrontUpdate, TenantId, Theme, ThemeUpdate,
};
use tracing::{info, instrument};

use super::{TenantdeskClient, path_segment, require_id};
use crate::cache::{CacheKey, ResourceKind};
use crate::error::ApiError;
use crate::gateway::QueryParams;

const COLLECTION_PATH: &str = "/storefronts/";

/// Filters for [`StorefrontsApi::list`]. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorefrontFilters {
    pub tenant: Option<TenantId>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl StorefrontFilters {
    /// Query parameters for these filters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("tenant", self.tenant.as_ref().map(TenantId::as_str))
            .with_opt("is_published", self.is_published)
            .with_opt("search", self.search.clone())
            .with_opt("page", self.page)
    }
}

/// Storefront operations. Obtained from [`TenantdeskClient::storefronts`].
#[derive(Debug, Clone, Copy)]
pub struct StorefrontsApi<'a> {
    client: &'a TenantdeskClient,
}

impl<'a> StorefrontsApi<'a> {
    pub(super) const fn new(client: &'a TenantdeskClient) -> Self {
        Self { client }
    }

    /// One page of storefronts matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filters: &StorefrontFilters) -> Result<Page<Storefront>, ApiError> {
        let query = filters.to_query();
        self.client
            .read(&CacheKey::StorefrontList(query.clone()), COLLECTION_PATH, query)
            .await
    }

    /// A single storefront.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn get(&self, id: &StorefrontId) -> Result<Storefront, ApiError> {
        require_id("storefront", id.as_str())?;
        self.client
            .read(
                &CacheKey::StorefrontDetail(id.clone()),
                &detail_path(id, ""),
                QueryParams::new(),
            )
            .await
    }

    /// Create a storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the storefront or the request
    /// fails.
    #[instrument(skip(self, data), fields(store_name = %data.store_name))]
    pub async fn create(&self, data: &CreateStorefront) -> Result<Storefront, ApiError> {
        let result = self.client.gateway().post(COLLECTION_PATH, Some(data)).await;
        let storefront: Storefront = self.client.checked(result).await?;

        self.store(&storefront).await;
        info!(storefront_id = %storefront.id, "Storefront created");
        Ok(storefront)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server rejects the update or the request fails.
    #[instrument(skip(self, data), fields(storefront_id = %id))]
    pub async fn update(
        &self,
        id: &StorefrontId,
        data: &StorefrontUpdate,
    ) -> Result<Storefront, ApiError> {
        require_id("storefront", id.as_str())?;
        let result = self
            .client
            .gateway()
            .patch(&detail_path(id, ""), Some(data))
            .await;
        let storefront: Storefront = self.client.checked(result).await?;

        self.store(&storefront).await;
        Ok(storefront)
    }

    /// Delete a storefront.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn remove(&self, id: &StorefrontId) -> Result<(), ApiError> {
        require_id("storefront", id.as_str())?;
        let result = self
            .client
            .gateway()
            .delete::<()>(&detail_path(id, ""))
            .await;
        self.client.checked(result).await?;

        let cache = self.client.cache();
        cache
            .remove_subtree(&CacheKey::StorefrontDetail(id.clone()))
            .await;
        cache.invalidate_lists(ResourceKind::Storefronts).await;

        info!("Storefront deleted");
        Ok(())
    }

    /// Make a storefront publicly visible.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server refuses or the request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn publish(&self, id: &StorefrontId) -> Result<Storefront, ApiError> {
        self.set_published(id, "publish/").await
    }

    /// Take a storefront offline.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server refuses or the request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn unpublish(&self, id: &StorefrontId) -> Result<Storefront, ApiError> {
        self.set_published(id, "unpublish/").await
    }

    /// A storefront's theme.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn theme(&self, id: &StorefrontId) -> Result<Theme, ApiError> {
        require_id("storefront", id.as_str())?;
        self.client
            .read(
                &CacheKey::StorefrontTheme(id.clone()),
                &detail_path(id, "theme/"),
                QueryParams::new(),
            )
            .await
    }

    /// Apply a partial theme update.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server rejects the theme or the request fails.
    #[instrument(skip(self, data), fields(storefront_id = %id))]
    pub async fn update_theme(&self, id: &StorefrontId, data: &ThemeUpdate) -> Result<Theme, ApiError> {
        require_id("storefront", id.as_str())?;
        let result = self
            .client
            .gateway()
            .patch(&detail_path(id, "theme/"), Some(data))
            .await;
        let theme: Theme = self.client.checked(result).await?;

        let cache = self.client.cache();
        cache
            .set(&CacheKey::StorefrontTheme(id.clone()), theme.clone())
            .await;
        cache
            .mark_stale(&CacheKey::StorefrontDetail(id.clone()))
            .await;

        Ok(theme)
    }

    /// A storefront's settings.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// request fails.
    #[instrument(skip(self), fields(storefront_id = %id))]
    pub async fn settings(&self, id: &StorefrontId) -> Result<StorefrontSettings, ApiError> {
        require_id("storefront", id.as_str())?;
        self.client
            .read(
                &CacheKey::StorefrontSettings(id.clone()),
                &detail_path(id, "settings/"),
                QueryParams::new(),
            )
            .await
    }

    /// Apply a partial settings update.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a blank id, or an error if the
    /// server rejects the settings or the request fails.
    #[instrument(skip(self, data), fields(storefront_id = %id))]
    pub async fn update_settings(
        &self,
        id: &StorefrontId,
        data: &SettingsUpdate,
    ) -> Result<StorefrontSettings, ApiError> {
        require_id("storefront", id.as_str())?;
        let result = self
            .client
            .gateway()
            .patch(&detail_path(id, "settings/"), Some(data))
            .await;
        let settings: StorefrontSettings = self.client.checked(result).await?;

        let cache = self.client.cache();
        cache
            .set(&CacheKey::StorefrontSettings(id.clone()), settings.clone())
            .await;
        cache
            .mark_stale(&CacheKey::StorefrontDetail(id.clone()))
            .await;

        Ok(settings)
    }

    async fn set_published(&self, id: &StorefrontId, action: &str) -> Result<Storefront, ApiError> {
        require_id("storefront", id.as_str())?;
        let result = self
            .client
            .gateway()
            .post::<PublishResponse, ()>(&detail_path(id, action), None)
            .await;
        let storefront = self.client.checked(result).await?.into_storefront();

        self.store(&storefront).await;
        info!(is_published = storefront.is_published, "Storefront visibility changed");
        Ok(storefront)
    }

    /// Record the server's representation and invalidate lists.
    async fn store(&self, storefront: &Storefront) {
        let cache = self.client.cache();
        cache
            .set(
                &CacheKey::StorefrontDetail(storefront.id.clone()),
                storefront.clone(),
            )
            .await;
        cache.invalidate_lists(ResourceKind::Storefronts).await;
    }
}

fn detail_path(id: &StorefrontId, suffix: &str) -> String {
    format!("{COLLECTION_PATH}{}/{suffix}", path_segment(id.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::session::SessionStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> TenantdeskClient {
        let config = ClientConfig::with_api_url(&server.uri()).unwrap();
        let session = SessionStore::in_memory();
        session.restore().await;
        TenantdeskClient::new(&config, session).unwrap()
    }

    fn storefront_json(published: bool) -> serde_json::Value {
        json!({"id": 9, "tenant": 1, "store_name": "Acme Outlet", "is_published": published})
    }

    #[test]
    fn test_filters_to_query() {
        let filters = StorefrontFilters {
            tenant: Some(TenantId::from(4_i64)),
            is_published: Some(false),
            ..StorefrontFilters::default()
        };
        assert_eq!(filters.to_query().canonical(), "is_published=false&tenant=4");
    }

    #[test]
    fn test_detail_paths() {
        let id = StorefrontId::from(9_i64);
        assert_eq!(detail_path(&id, ""), "/storefronts/9/");
        assert_eq!(detail_path(&id, "theme/"), "/storefronts/9/theme/");
    }

    #[tokio::test]
    async fn test_publish_accepts_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storefronts/9/publish/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Storefront published successfully",
                "storefront": storefront_json(true)
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let storefront = client
            .storefronts()
            .publish(&StorefrontId::from(9_i64))
            .await
            .unwrap();
        assert!(storefront.is_published);

        let cached: Storefront = client
            .cache()
            .peek(&CacheKey::StorefrontDetail(StorefrontId::from(9_i64)))
            .await
            .unwrap();
        assert!(cached.is_published);
    }

    #[tokio::test]
    async fn test_unpublish_accepts_bare_storefront() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storefronts/9/unpublish/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(storefront_json(false)))
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let storefront = client
            .storefronts()
            .unpublish(&StorefrontId::from(9_i64))
            .await
            .unwrap();
        assert!(!storefront.is_published);
    }

    #[tokio::test]
    async fn test_update_theme_overwrites_theme_and_stales_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storefronts/9/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(storefront_json(false)))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/storefronts/9/theme/"))
            .and(body_json(json!({"primary_color": "#112233"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "storefront": 9,
                "primary_color": "#112233"
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        let id = StorefrontId::from(9_i64);
        client.storefronts().get(&id).await.unwrap();

        let update = ThemeUpdate {
            primary_color: Some("#112233".to_string()),
            ..ThemeUpdate::default()
        };
        let theme = client.storefronts().update_theme(&id, &update).await.unwrap();
        assert_eq!(theme.primary_color, "#112233");

        let cache = client.cache();
        let cached: Theme = cache.peek(&CacheKey::StorefrontTheme(id.clone())).await.unwrap();
        assert_eq!(cached, theme);
        assert!(cache.entry(&CacheKey::StorefrontDetail(id)).await.unwrap().stale);
    }

    #[tokio::test]
    async fn test_settings_keep_unknown_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storefronts/9/settings/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2,
                "storefront": 9,
                "products_per_page": 24,
                "free_shipping_threshold": "50.00",
                "enable_reviews": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server).await;

        let settings = client
            .storefronts()
            .settings(&StorefrontId::from(9_i64))
            .await
            .unwrap();
        assert_eq!(settings.products_per_page, Some(24));
        assert_eq!(settings.extra.get("enable_reviews"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_failed_publish_leaves_cache_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storefronts/9/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(storefront_json(false)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/storefronts/9/publish/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": "Storefront is missing a theme"})),
            )
            .mount(&server)
            .await;
        let client = client_for(&server).await;
        let id = StorefrontId::from(9_i64);
        client.storefronts().get(&id).await.unwrap();
        let before = client
            .cache()
            .entry(&CacheKey::StorefrontDetail(id.clone()))
            .await
            .unwrap();

        let err = client.storefronts().publish(&id).await.unwrap_err();
        assert_eq!(err.user_message(), "Storefront is missing a theme");

        let after = client
            .cache()
            .entry(&CacheKey::StorefrontDetail(id))
            .await
            .unwrap();
        assert_eq!(before, after);
    }
}
