//! Storefront commands.
//!
//! # Usage
//!
//! ```bash
//! td storefronts list --tenant 4 --published false
//! td storefronts publish 9
//! td storefronts set-theme 9 --primary-color "#112233"
//! td storefronts set-settings 9 --products-per-page 24
//! ```

use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;
use tenantdesk_client::StorefrontFilters;
use tenantdesk_core::{
    CreateStorefront, SettingsUpdate, StorefrontId, StorefrontUpdate, TenantId, ThemeUpdate,
};

use super::{CommandError, Context, print_json};

#[derive(Subcommand)]
pub enum StorefrontAction {
    /// List storefronts
    List {
        /// Only storefronts of this tenant
        #[arg(short, long)]
        tenant: Option<TenantId>,
        /// Only published (true) or draft (false) storefronts
        #[arg(long)]
        published: Option<bool>,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one storefront
    Get { id: StorefrontId },
    /// Create a storefront
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
    },
    /// Change a storefront; only the given fields are sent
    Update {
        id: StorefrontId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        tagline: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        #[arg(long)]
        contact_phone: Option<String>,
        #[arg(long)]
        meta_title: Option<String>,
        #[arg(long)]
        meta_description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a storefront
    Delete { id: StorefrontId },
    /// Make a storefront public
    Publish { id: StorefrontId },
    /// Take a storefront offline
    Unpublish { id: StorefrontId },
    /// Show a storefront's theme
    Theme { id: StorefrontId },
    /// Change a storefront's theme
    SetTheme {
        id: StorefrontId,
        #[arg(long)]
        primary_color: Option<String>,
        #[arg(long)]
        secondary_color: Option<String>,
        #[arg(long)]
        accent_color: Option<String>,
        #[arg(long)]
        background_color: Option<String>,
        #[arg(long)]
        text_color: Option<String>,
        #[arg(long)]
        font_family: Option<String>,
        #[arg(long)]
        heading_font_family: Option<String>,
    },
    /// Show a storefront's settings
    Settings { id: StorefrontId },
    /// Change a storefront's settings
    SetSettings {
        id: StorefrontId,
        #[arg(long)]
        products_per_page: Option<u32>,
        #[arg(long)]
        enable_search: Option<bool>,
        #[arg(long)]
        enable_guest_checkout: Option<bool>,
        #[arg(long)]
        free_shipping_threshold: Option<Decimal>,
    },
}

/// Run a storefront command.
///
/// # Errors
///
/// Returns an error if not logged in, the input is invalid, or the request
/// fails.
pub async fn run(ctx: &Context, action: StorefrontAction) -> Result<(), CommandError> {
    ctx.require(true).await?;
    let storefronts = ctx.client.storefronts();

    match action {
        StorefrontAction::List {
            tenant,
            published,
            search,
            page,
        } => {
            let filters = StorefrontFilters {
                tenant,
                is_published: published,
                search,
                page,
            };
            print_json(&storefronts.list(&filters).await?)
        }
        StorefrontAction::Get { id } => print_json(&storefronts.get(&id).await?),
        StorefrontAction::Create {
            name,
            description,
            contact_email,
        } => {
            let data = CreateStorefront {
                store_name: name,
                store_description: description,
                contact_email,
            };
            print_json(&storefronts.create(&data).await?)
        }
        StorefrontAction::Update {
            id,
            name,
            description,
            tagline,
            contact_email,
            contact_phone,
            meta_title,
            meta_description,
            active,
        } => {
            let data = StorefrontUpdate {
                store_name: name,
                store_description: description,
                store_tagline: tagline,
                contact_email,
                contact_phone,
                meta_title,
                meta_description,
                is_active: active,
                ..StorefrontUpdate::default()
            };
            if data.is_empty() {
                return Err(CommandError::nothing_to_update());
            }
            print_json(&storefronts.update(&id, &data).await?)
        }
        StorefrontAction::Delete { id } => {
            storefronts.remove(&id).await?;
            print_json(&json!({ "message": format!("Storefront {id} deleted") }))
        }
        StorefrontAction::Publish { id } => print_json(&storefronts.publish(&id).await?),
        StorefrontAction::Unpublish { id } => print_json(&storefronts.unpublish(&id).await?),
        StorefrontAction::Theme { id } => print_json(&storefronts.theme(&id).await?),
        StorefrontAction::SetTheme {
            id,
            primary_color,
            secondary_color,
            accent_color,
            background_color,
            text_color,
            font_family,
            heading_font_family,
        } => {
            let data = ThemeUpdate {
                primary_color,
                secondary_color,
                accent_color,
                background_color,
                text_color,
                font_family,
                heading_font_family,
                ..ThemeUpdate::default()
            };
            if data.is_empty() {
                return Err(CommandError::nothing_to_update());
            }
            print_json(&storefronts.update_theme(&id, &data).await?)
        }
        StorefrontAction::Settings { id } => print_json(&storefronts.settings(&id).await?),
        StorefrontAction::SetSettings {
            id,
            products_per_page,
            enable_search,
            enable_guest_checkout,
            free_shipping_threshold,
        } => {
            let data = SettingsUpdate {
                products_per_page,
                enable_search,
                enable_guest_checkout,
                free_shipping_threshold,
                ..SettingsUpdate::default()
            };
            if data.is_empty() {
                return Err(CommandError::nothing_to_update());
            }
            print_json(&storefronts.update_settings(&id, &data).await?)
        }
    }
}
