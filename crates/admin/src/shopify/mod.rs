//! Shopify Admin API client.
//!
//! # Security
//!
//! This module holds the Admin API access token for the installed app. The
//! token is only ever sent to the configured Admin GraphQL endpoint.
//!
//! # Architecture
//!
//! - Queries implement `graphql_client::GraphQLQuery` and are executed through
//!   a single generic `AdminClient::execute` path
//! - Direct API calls to Shopify (no local catalog sync)
//! - The client is the production [`CatalogPageSource`](crate::catalog::CatalogPageSource)

mod admin;

pub use admin::AdminClient;
pub use admin::queries;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but is missing data the caller requires.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
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
