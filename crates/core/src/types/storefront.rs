//! Storefront, theme, and storefront settings records.
//!
//! List endpoints return a trimmed storefront representation, so almost every
//! field is defaulted when absent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{SettingsId, StorefrontId, TenantId, ThemeId};

/// A tenant's online store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storefront {
    pub id: StorefrontId,
    #[serde(default)]
    pub tenant: Option<TenantId>,
    #[serde(default)]
    pub store_name: String,
    #[serde(default)]
    pub store_description: Option<String>,
    #[serde(default)]
    pub store_tagline: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_address: Option<String>,
    #[serde(default)]
    pub business_hours: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub social_links: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Option<String>,
    #[serde(default)]
    pub og_image_url: Option<String>,
    #[serde(default)]
    pub google_analytics_id: Option<String>,
    #[serde(default)]
    pub facebook_pixel_id: Option<String>,
    #[serde(default)]
    pub google_tag_manager_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Embedded theme, present on detail and list representations.
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// Form for creating a storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorefront {
    pub store_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// Partial storefront update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl StorefrontUpdate {
    /// Whether the update carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Response to publish/unpublish.
///
/// The backend wraps the storefront in a `{ message, storefront }` envelope;
/// older deployments return the storefront directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PublishResponse {
    Envelope {
        #[serde(default)]
        message: Option<String>,
        storefront: Storefront,
    },
    Bare(Storefront),
}

impl PublishResponse {
    /// Extract the updated storefront.
    #[must_use]
    pub fn into_storefront(self) -> Storefront {
        match self {
            Self::Envelope { storefront, .. } | Self::Bare(storefront) => storefront,
        }
    }
}

/// Product grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    #[default]
    Grid,
    List,
    Masonry,
    Carousel,
}

/// Sidebar placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SidebarPosition {
    Left,
    Right,
    #[default]
    None,
}

/// Visual styling attached to a storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    #[serde(default)]
    pub storefront: Option<StorefrontId>,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub secondary_color: String,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default)]
    pub background_color: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default)]
    pub link_color: String,
    #[serde(default)]
    pub success_color: String,
    #[serde(default)]
    pub warning_color: String,
    #[serde(default)]
    pub error_color: String,
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub heading_font_family: String,
    #[serde(default)]
    pub font_size_base: String,
    #[serde(default)]
    pub line_height_base: Option<f64>,
    #[serde(default)]
    pub layout_type: LayoutType,
    #[serde(default)]
    pub container_width: String,
    #[serde(default)]
    pub sidebar_position: SidebarPosition,
    #[serde(default)]
    pub spacing_unit: String,
    #[serde(default)]
    pub border_radius: String,
    #[serde(default)]
    pub box_shadow: String,
    #[serde(default)]
    pub custom_css: Option<String>,
    #[serde(default)]
    pub custom_js: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial theme update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<LayoutType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<SidebarPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_js: Option<String>,
}

impl ThemeUpdate {
    /// Whether the update carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Catalog, checkout, and notification switches for a storefront.
///
/// The commonly edited switches are typed; the rest of the settings document
/// is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontSettings {
    pub id: SettingsId,
    #[serde(default)]
    pub storefront: Option<StorefrontId>,
    #[serde(default)]
    pub products_per_page: Option<u32>,
    #[serde(default)]
    pub enable_search: Option<bool>,
    #[serde(default)]
    pub enable_guest_checkout: Option<bool>,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Partial settings update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_guest_checkout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SettingsUpdate {
    /// Whether the update carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
