//! Dashboard aggregates: headline statistics, recent activity, health, charts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::commerce::OrderStatus;
use super::id::{OrderId, StorefrontId, TenantId};

/// Headline platform statistics.
///
/// `recent_*` are counts over the last seven days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_tenants: u64,
    #[serde(default)]
    pub total_storefronts: u64,
    #[serde(default)]
    pub total_products: Option<u64>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Decimal,
    #[serde(default)]
    pub recent_orders: u64,
    #[serde(default)]
    pub recent_tenants: u64,
}

/// Latest orders, tenants, and storefronts across the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    #[serde(default)]
    pub recent_orders: Vec<RecentOrder>,
    #[serde(default)]
    pub recent_tenants: Vec<RecentTenant>,
    #[serde(default)]
    pub recent_storefronts: Vec<RecentStorefront>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTenant {
    pub id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentStorefront {
    pub id: StorefrontId,
    pub store_name: String,
    pub tenant_name: String,
    pub created_at: DateTime<Utc>,
}

/// Overall platform health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
}

/// Platform health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceHealth>,
    /// Seconds since the API process started.
    #[serde(default)]
    pub uptime: u64,
    /// Percent.
    #[serde(default)]
    pub memory_usage: f64,
    /// Percent.
    #[serde(default)]
    pub cpu_usage: f64,
}

/// Health of one backing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    /// Milliseconds.
    #[serde(default)]
    pub response_time: f64,
}

/// Window for time-series charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartPeriod {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl ChartPeriod {
    /// Wire representation (`7d`, `30d`, `90d`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown chart period.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown chart period: {0} (expected 7d, 30d, or 90d)")]
pub struct ParseChartPeriodError(String);

impl FromStr for ChartPeriod {
    type Err = ParseChartPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            _ => Err(ParseChartPeriodError(s.to_owned())),
        }
    }
}

/// One point of a time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub value: f64,
}

/// One bar/slice of a categorical chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub color: Option<String>,
}
