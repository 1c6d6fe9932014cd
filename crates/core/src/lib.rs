//! Meridian Core - Shared domain types.
//!
//! This crate provides the common types used across Meridian components:
//! - `server` - Storefront JSON API (catalog, categories, cart)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, cart quantities, and
//!   anonymous cart tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
