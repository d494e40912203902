//! Shopify Storefront API client implementation.
//!
//! Resolves upsell products with a single `nodes` lookup and caches them with
//! `moka` (5-minute TTL). Cart operations are never cached.

mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use checkout_upsell_core::ProductGid;

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, UpsellProduct};
use crate::shopify::{GraphQLError, ShopifyError};

use conversions::{convert_cart, convert_product, join_user_errors};
use queries::{
    AddCartLines, CreateCart, GetCart, GetProductsByIds, add_cart_lines, create_cart, get_cart,
    get_products_by_ids,
};

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    products: Cache<ProductGid, UpsellProduct>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_endpoint(),
                access_token: config.storefront_private_token.clone(),
                products,
            }),
        }
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                path: vec![],
            }]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Resolve products by global ID, in the order given.
    ///
    /// IDs that do not resolve to a purchasable product are omitted. Cached
    /// products are served without a request; the rest are fetched with one
    /// `nodes` query.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn products_by_ids(
        &self,
        ids: &[ProductGid],
    ) -> Result<Vec<UpsellProduct>, ShopifyError> {
        let mut missing = Vec::new();
        for id in ids {
            if self.inner.products.get(id).await.is_none() && !missing.contains(id) {
                missing.push(id.clone());
            }
        }

        if missing.is_empty() {
            debug!("Cache hit for all upsell products");
        } else {
            let variables = get_products_by_ids::Variables {
                ids: missing.iter().map(|id| id.as_str().to_string()).collect(),
            };
            let data = self.execute::<GetProductsByIds>(variables).await?;

            for product in data.nodes.into_iter().flatten().filter_map(convert_product) {
                self.inner
                    .products
                    .insert(product.id.clone(), product)
                    .await;
            }
        }

        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.inner.products.get(id).await
                && !products.iter().any(|p: &UpsellProduct| p.id == product.id)
            {
                products.push(product);
            }
        }
        Ok(products)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create a new, empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let data = self.execute::<CreateCart>(create_cart::Variables).await?;

        if let Some(result) = data.cart_create {
            if !result.user_errors.is_empty() {
                return Err(ShopifyError::UserError(join_user_errors(
                    result.user_errors,
                )));
            }

            if let Some(cart) = result.cart {
                return Ok(convert_cart(cart));
            }
        }

        Err(ShopifyError::GraphQL(vec![GraphQLError {
            message: "Failed to create cart".to_string(),
            path: vec![],
        }]))
    }

    /// Get an existing cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the cart does not exist or has
    /// expired, or an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("Cart not found: {cart_id}")))
    }

    /// Add a single line to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id, merchandise_id = %merchandise_id))]
    pub async fn add_cart_line(
        &self,
        cart_id: &str,
        merchandise_id: &str,
        quantity: i64,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: vec![add_cart_lines::CartLineInput {
                merchandise_id: merchandise_id.to_string(),
                quantity,
            }],
        };

        let data = self.execute::<AddCartLines>(variables).await?;

        if let Some(result) = data.cart_lines_add {
            if !result.user_errors.is_empty() {
                return Err(ShopifyError::UserError(join_user_errors(
                    result.user_errors,
                )));
            }

            if let Some(cart) = result.cart {
                return Ok(convert_cart(cart));
            }
        }

        Err(ShopifyError::GraphQL(vec![GraphQLError {
            message: "Failed to add to cart".to_string(),
            path: vec![],
        }]))
    }
}
