//! Client for the merchant app's public upsell API.
//!
//! `GET {UPSELL_API_URL}/api/upsell?shopDomain=<domain>` returns the shop's
//! selected product IDs. The storefront only needs `shopifyProductId`.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use checkout_upsell_core::ShopDomain;

/// Errors from the upsell API.
#[derive(Debug, Error)]
pub enum UpsellApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The merchant app does not know this shop.
    #[error("Shop not found: {0}")]
    ShopNotFound(ShopDomain),

    #[error("Upsell API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid upsell API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// One upsell item as served by the merchant app.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellItem {
    pub shopify_product_id: String,
}

/// HTTP client for `/api/upsell`.
#[derive(Debug, Clone)]
pub struct UpsellApiClient {
    inner: Arc<UpsellApiClientInner>,
}

#[derive(Debug)]
struct UpsellApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl UpsellApiClient {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            inner: Arc::new(UpsellApiClientInner {
                client: reqwest::Client::new(),
                base_url,
            }),
        }
    }

    /// Fetch the raw product IDs selected for `shop`, in item order.
    ///
    /// # Errors
    ///
    /// Returns `UpsellApiError::ShopNotFound` on 404, `UpsellApiError::Status`
    /// for any other non-success status, and `UpsellApiError::Http` for
    /// transport or decoding failures.
    #[instrument(skip(self), fields(shop = %shop))]
    pub async fn product_ids(&self, shop: &ShopDomain) -> Result<Vec<String>, UpsellApiError> {
        let mut url = self.inner.base_url.join("api/upsell")?;
        url.query_pairs_mut()
            .append_pair("shopDomain", shop.as_str());

        let response = self.inner.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpsellApiError::ShopNotFound(shop.clone()));
        }
        if !status.is_success() {
            return Err(UpsellApiError::Status(status));
        }

        let items: Vec<UpsellItem> = response.json().await?;
        Ok(items.into_iter().map(|i| i.shopify_product_id).collect())
    }
}
