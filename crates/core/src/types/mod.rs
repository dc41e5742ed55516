//! Core types for Tenantdesk.
//!
//! This module provides type-safe wrappers and records for the remote API.

pub mod auth;
pub mod commerce;
pub mod dashboard;
pub mod id;
pub mod page;
pub mod storefront;
pub mod tenant;

pub use auth::*;
pub use commerce::*;
pub use dashboard::*;
pub use id::*;
pub use page::Page;
pub use storefront::*;
pub use tenant::*;
