//! Tenantdesk Core - Shared API types.
//!
//! This crate provides the records exchanged with the remote administration
//! API, used by every Tenantdesk component:
//! - `client` - Authenticated API client, session store, and query cache
//! - `cli` - Command-line front-end over the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no cache.
//! The server is the source of truth for every record defined here; these
//! are advisory copies.
//!
//! # Modules
//!
//! - [`types`] - Opaque IDs, entities, pagination, forms, and dashboard aggregates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
