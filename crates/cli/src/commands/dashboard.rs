//! Dashboard commands.

use std::time::Duration;

use clap::Subcommand;
use tenantdesk_client::{CacheKey, DEFAULT_TOP_PRODUCTS};
use tenantdesk_core::ChartPeriod;

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum DashboardView {
    /// Headline platform statistics
    Stats {
        /// Refetch every N seconds until interrupted
        #[arg(short, long, value_name = "SECS")]
        watch: Option<u64>,
    },
    /// Latest orders, tenants, and storefronts
    Activity,
    /// Service health overview
    Health,
    /// Revenue per day
    Revenue {
        /// Window: 7d, 30d, or 90d
        #[arg(short, long, default_value = "30d")]
        period: ChartPeriod,
    },
    /// Orders per day
    Orders {
        /// Window: 7d, 30d, or 90d
        #[arg(short, long, default_value = "30d")]
        period: ChartPeriod,
    },
    /// Best-selling products
    TopProducts {
        #[arg(short, long, default_value_t = DEFAULT_TOP_PRODUCTS)]
        limit: u32,
    },
}

/// Run a dashboard view.
///
/// # Errors
///
/// Returns an error if not logged in or the request fails.
pub async fn run(ctx: &Context, view: DashboardView) -> Result<(), CommandError> {
    ctx.require(true).await?;
    let dashboard = ctx.client.dashboard();

    match view {
        DashboardView::Stats { watch: None } => print_json(&dashboard.stats().await?),
        DashboardView::Stats { watch: Some(secs) } => watch_stats(ctx, secs).await,
        DashboardView::Activity => print_json(&dashboard.activity().await?),
        DashboardView::Health => print_json(&dashboard.health().await?),
        DashboardView::Revenue { period } => print_json(&dashboard.revenue_chart(period).await?),
        DashboardView::Orders { period } => print_json(&dashboard.orders_chart(period).await?),
        DashboardView::TopProducts { limit } => {
            print_json(&dashboard.top_products(limit).await?)
        }
    }
}

async fn watch_stats(ctx: &Context, secs: u64) -> Result<(), CommandError> {
    if secs == 0 {
        return Err(CommandError::InvalidInput(
            "watch interval must be at least 1 second".to_string(),
        ));
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ctx.client.cache().mark_stale(&CacheKey::DashboardStats).await;
                let stats = ctx.client.dashboard().stats().await?;
                print_json(&stats)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Stopped watching");
                return Ok(());
            }
        }
    }
}
