//! TechSpec Core - Shared domain types.
//!
//! This crate provides the types used across all TechSpec components:
//! - `storefront` - Public catalog API (browsing, search, reviews, shops)
//! - `admin` - Token-gated moderation and bulk import endpoints
//! - `cli` - Sitemap generation and operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Rows are
//! shaped exactly like the hosted backend returns them so they deserialize
//! straight from its JSON responses.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, statuses, slugs, prices, ratings and emails
//! - [`models`] - Entity rows (products, categories, shops, reviews, profiles)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
