//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - Queries implement `graphql_client::GraphQLQuery` with hand-written
//!   variables and response types
//! - Shopify is source of truth - direct API calls, no local sync
//! - Server-side calls authenticate with the private Storefront token
//!
//! # Example
//!
//! ```rust,ignore
//! use checkout_upsell_storefront::shopify::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! // Resolve upsell products
//! let products = client.products_by_ids(&[ProductGid::normalize("123")]).await?;
//!
//! // Create a cart and add the first variant
//! let cart = client.create_cart().await?;
//! let cart = client.add_cart_line(&cart.id, &products[0].variant_id, 1).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use storefront::queries;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
