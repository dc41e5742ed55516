//! Tenant commands.
//!
//! # Usage
//!
//! ```bash
//! td tenants list --plan pro --active true
//! td tenants create -n "Acme" --subdomain acme --plan basic
//! td tenants update 12 --name "Acme Corp"
//! td tenants usage 12
//! ```

use clap::Subcommand;
use serde_json::json;
use tenantdesk_client::TenantFilters;
use tenantdesk_core::{CreateTenant, PlanType, TenantId, TenantUpdate};

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum TenantAction {
    /// List tenants
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
        /// Only tenants on this plan
        #[arg(long)]
        plan: Option<PlanType>,
        /// Only active (true) or inactive (false) tenants
        #[arg(long)]
        active: Option<bool>,
    },
    /// Show one tenant
    Get { id: TenantId },
    /// Create a tenant
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        subdomain: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        /// free, basic, pro, or enterprise
        #[arg(long, default_value = "free")]
        plan: PlanType,
    },
    /// Change a tenant; only the given fields are sent
    Update {
        id: TenantId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        subdomain: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        plan: Option<PlanType>,
        #[arg(long)]
        contact_email: Option<String>,
        #[arg(long)]
        contact_phone: Option<String>,
        #[arg(long)]
        contact_address: Option<String>,
    },
    /// Delete a tenant
    Delete { id: TenantId },
    /// Content counters for a tenant
    Stats { id: TenantId },
    /// Consumption against plan limits
    Usage { id: TenantId },
}

/// Run a tenant command.
///
/// # Errors
///
/// Returns an error if not logged in, the input is invalid, or the request
/// fails.
pub async fn run(ctx: &Context, action: TenantAction) -> Result<(), CommandError> {
    ctx.require(true).await?;
    let tenants = ctx.client.tenants();

    match action {
        TenantAction::List {
            search,
            page,
            plan,
            active,
        } => {
            let filters = TenantFilters {
                search,
                plan_type: plan,
                is_active: active,
                page,
            };
            print_json(&tenants.list(&filters).await?)
        }
        TenantAction::Get { id } => print_json(&tenants.get(&id).await?),
        TenantAction::Create {
            name,
            subdomain,
            contact_email,
            plan,
        } => {
            let data = CreateTenant {
                name,
                subdomain,
                contact_email,
                plan_type: plan,
            };
            print_json(&tenants.create(&data).await?)
        }
        TenantAction::Update {
            id,
            name,
            domain,
            subdomain,
            active,
            plan,
            contact_email,
            contact_phone,
            contact_address,
        } => {
            let data = TenantUpdate {
                name,
                domain,
                subdomain,
                is_active: active,
                plan_type: plan,
                contact_email,
                contact_phone,
                contact_address,
            };
            if data.is_empty() {
                return Err(CommandError::nothing_to_update());
            }
            print_json(&tenants.update(&id, &data).await?)
        }
        TenantAction::Delete { id } => {
            tenants.remove(&id).await?;
            print_json(&json!({ "message": format!("Tenant {id} deleted") }))
        }
        TenantAction::Stats { id } => print_json(&tenants.stats(&id).await?),
        TenantAction::Usage { id } => print_json(&tenants.usage(&id).await?),
    }
}
