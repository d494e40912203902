//! Integration tests for Checkout Upsell.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a disposable database
//! export ADMIN_DATABASE_URL=postgres://localhost/checkout_upsell_test
//!
//! # Run the ignored database tests
//! cargo test -p checkout-upsell-integration-tests -- --ignored
//! ```
//!
//! Every test works on shops and products with unique random names, so runs
//! can share a database and leave rows behind.

use checkout_upsell_admin::db::{UpsellRepository, create_pool};
use checkout_upsell_core::ShopDomain;
use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the test database and bring its schema up to date.
///
/// # Panics
///
/// Panics if no database URL is configured, the database is unreachable, or
/// migrations fail.
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();

    let url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("ADMIN_DATABASE_URL must be set for database tests");

    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// A repository over the test database.
pub async fn test_repository() -> UpsellRepository {
    UpsellRepository::new(test_pool().await)
}

/// A shop domain no other test uses.
///
/// # Panics
///
/// Never in practice; the generated name is always a valid domain.
#[must_use]
pub fn unique_domain() -> ShopDomain {
    ShopDomain::parse(&format!("test-{}.myshopify.com", uuid::Uuid::new_v4().simple()))
        .expect("generated domain is valid")
}

/// A product ID no other test uses.
#[must_use]
pub fn unique_product_id() -> String {
    format!("gid://shopify/Product/{}", uuid::Uuid::new_v4().as_u128() % 1_000_000_000_000)
}
