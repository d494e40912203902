//! Database operations for admin `PostgreSQL`.
//!
//! ## Tables
//!
//! - `admin.shop` - Shops that have installed the app (one row per domain)
//! - `admin.upsell_item` - Products selected as upsells, owned by a shop
//! - `admin.session` - Merchant session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p checkout-upsell-cli -- migrate
//! ```

pub mod upsell;

#[cfg(test)]
pub mod memory;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use checkout_upsell_core::{ShopDomain, ShopId};

use crate::models::{Shop, ShopWithItems};

pub use upsell::UpsellRepository;

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

    /// Constraint violation (e.g., a product already selected).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence capability for shops and their upsell selections.
///
/// Handlers receive this as `Arc<dyn UpsellStore>` so that the route layer can
/// be exercised against an in-memory store.
#[async_trait]
pub trait UpsellStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Look up a shop by domain together with its items, ordered by item id.
    async fn find_shop_by_domain(
        &self,
        domain: &ShopDomain,
    ) -> Result<Option<ShopWithItems>, RepositoryError>;

    /// Return the shop for `domain`, creating it if it does not exist yet.
    async fn find_or_create_shop(&self, domain: &ShopDomain) -> Result<Shop, RepositoryError>;

    /// Insert one upsell item per product id, all or nothing.
    ///
    /// Returns the number of items created. Fails with
    /// [`RepositoryError::Conflict`] if any product id is already selected,
    /// by this shop or any other.
    async fn create_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError>;

    /// Delete the shop's items whose product id is in `product_ids`.
    ///
    /// Returns the number of items removed; zero matches is not an error.
    async fn delete_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError>;

    /// List all shops, oldest first.
    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
