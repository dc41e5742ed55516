//! Cache keys and cached values.

use std::fmt;

use tenantdesk_core::{
    ChartPeriod, ChartPoint, DashboardStats, Page, RecentActivity, Storefront, StorefrontId,
    StorefrontSettings, SystemHealth, Tenant, TenantId, TenantStats, TenantUsage, Theme,
    TimeSeriesPoint, User,
};
use url::form_urlencoded;

use crate::gateway::QueryParams;

/// Resource kinds whose list entries can be invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Tenants,
    Storefronts,
}

impl ResourceKind {
    /// Prefix shared by every list key of this kind.
    #[must_use]
    pub const fn list_prefix(self) -> &'static str {
        match self {
            Self::Tenants => "tenants:list:",
            Self::Storefronts => "storefronts:list:",
        }
    }
}

/// Cache key for every cached read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKey {
    Profile,
    TenantList(QueryParams),
    TenantDetail(TenantId),
    TenantStats(TenantId),
    TenantUsage(TenantId),
    StorefrontList(QueryParams),
    StorefrontDetail(StorefrontId),
    StorefrontTheme(StorefrontId),
    StorefrontSettings(StorefrontId),
    DashboardStats,
    DashboardActivity,
    DashboardHealth,
    RevenueChart(ChartPeriod),
    OrdersChart(ChartPeriod),
    TopProducts(u32),
}

impl CacheKey {
    /// Stable string form used as the moka key.
    ///
    /// Sub-entries of a record (stats, usage, theme, settings) extend the
    /// record's detail key, so a prefix match on the detail key finds them.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Profile => "auth:user".to_string(),
            Self::TenantList(filters) => format!("tenants:list:{}", filters.canonical()),
            Self::TenantDetail(id) => tenant_detail(id),
            Self::TenantStats(id) => format!("{}:stats", tenant_detail(id)),
            Self::TenantUsage(id) => format!("{}:usage", tenant_detail(id)),
            Self::StorefrontList(filters) => format!("storefronts:list:{}", filters.canonical()),
            Self::StorefrontDetail(id) => storefront_detail(id),
            Self::StorefrontTheme(id) => format!("{}:theme", storefront_detail(id)),
            Self::StorefrontSettings(id) => format!("{}:settings", storefront_detail(id)),
            Self::DashboardStats => "dashboard:stats".to_string(),
            Self::DashboardActivity => "dashboard:activity".to_string(),
            Self::DashboardHealth => "dashboard:health".to_string(),
            Self::RevenueChart(period) => format!("dashboard:charts:revenue:{period}"),
            Self::OrdersChart(period) => format!("dashboard:charts:orders:{period}"),
            Self::TopProducts(limit) => format!("dashboard:charts:products:{limit}"),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn tenant_detail(id: &TenantId) -> String {
    format!("tenants:detail:{}", encode_segment(id.as_str()))
}

fn storefront_detail(id: &StorefrontId) -> String {
    format!("storefronts:detail:{}", encode_segment(id.as_str()))
}

// Ids are opaque; escape ':' so an id can never forge a sub-entry key
fn encode_segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Cached value types.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    User(Box<User>),
    Tenants(Page<Tenant>),
    Tenant(Box<Tenant>),
    TenantStats(TenantStats),
    TenantUsage(TenantUsage),
    Storefronts(Page<Storefront>),
    Storefront(Box<Storefront>),
    Theme(Box<Theme>),
    Settings(Box<StorefrontSettings>),
    DashboardStats(Box<DashboardStats>),
    Activity(Box<RecentActivity>),
    Health(Box<SystemHealth>),
    Series(Vec<TimeSeriesPoint>),
    Points(Vec<ChartPoint>),
}

/// A type that can live in the cache.
pub trait Cached: Clone + Sized {
    fn into_value(self) -> CacheValue;
    fn from_value(value: &CacheValue) -> Option<Self>;
}

macro_rules! cached_boxed {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Cached for $ty {
                fn into_value(self) -> CacheValue {
                    CacheValue::$variant(Box::new(self))
                }

                fn from_value(value: &CacheValue) -> Option<Self> {
                    match value {
                        CacheValue::$variant(inner) => Some((**inner).clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! cached_inline {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Cached for $ty {
                fn into_value(self) -> CacheValue {
                    CacheValue::$variant(self)
                }

                fn from_value(value: &CacheValue) -> Option<Self> {
                    match value {
                        CacheValue::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

cached_boxed! {
    User => User,
    Tenant => Tenant,
    Storefront => Storefront,
    Theme => Theme,
    StorefrontSettings => Settings,
    DashboardStats => DashboardStats,
    RecentActivity => Activity,
    SystemHealth => Health,
}

cached_inline! {
    Page<Tenant> => Tenants,
    Page<Storefront> => Storefronts,
    TenantStats => TenantStats,
    TenantUsage => TenantUsage,
    Vec<TimeSeriesPoint> => Series,
    Vec<ChartPoint> => Points,
}
