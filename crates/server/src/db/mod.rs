//! Database operations for the Meridian `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `categories` - Category tree (slug, name, parent)
//! - `products` - Catalog entities
//! - `product_variants` - Purchasable SKUs with authoritative prices
//! - `variant_images` / `variant_attributes` - Per-variant assets and facts
//! - `carts` / `cart_items` - Per-identity carts with snapshotted prices
//! - `sessions` - Tower-sessions storage (created by the session store)
//!
//! ## Views
//!
//! - `vw_product_full_view` - Denormalized projection backing the filtered
//!   catalog listing
//!
//! Migrations live in `crates/server/migrations/` and run on startup.

pub mod carts;
pub mod catalog;
pub mod categories;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::{CartRepository, CartStore};
pub use catalog::CatalogViewRepository;
pub use categories::CategoryRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
