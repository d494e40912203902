//! Production [`CheckoutApi`] backed by the upsell API and the Storefront API.

use async_trait::async_trait;

use checkout_upsell_core::{ProductGid, ShopDomain};

use crate::shopify::{Cart, StorefrontClient, UpsellProduct};
use crate::upsell_api::UpsellApiClient;

use super::{CheckoutApi, WidgetError};

/// Widget collaborators for one storefront cart.
#[derive(Debug, Clone)]
pub struct StorefrontCheckoutApi {
    storefront: StorefrontClient,
    upsell_api: UpsellApiClient,
    shop: ShopDomain,
    cart_id: Option<String>,
}

impl StorefrontCheckoutApi {
    /// `cart_id` is `None` for visitors without a cart; adds then fail with
    /// `WidgetError::NoCart`.
    #[must_use]
    pub const fn new(
        storefront: StorefrontClient,
        upsell_api: UpsellApiClient,
        shop: ShopDomain,
        cart_id: Option<String>,
    ) -> Self {
        Self {
            storefront,
            upsell_api,
            shop,
            cart_id,
        }
    }
}

#[async_trait]
impl CheckoutApi for StorefrontCheckoutApi {
    async fn upsell_product_ids(&self) -> Result<Vec<String>, WidgetError> {
        Ok(self.upsell_api.product_ids(&self.shop).await?)
    }

    async fn resolve_products(
        &self,
        ids: &[ProductGid],
    ) -> Result<Vec<UpsellProduct>, WidgetError> {
        Ok(self.storefront.products_by_ids(ids).await?)
    }

    async fn add_cart_line(&self, variant_id: &str) -> Result<Cart, WidgetError> {
        let cart_id = self.cart_id.as_deref().ok_or(WidgetError::NoCart)?;
        Ok(self.storefront.add_cart_line(cart_id, variant_id, 1).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::test_config;
    use crate::widget::{Phase, UpsellWidget};

    async fn mount_upsell_api(server: &MockServer, ids: &[&str]) {
        let items: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| serde_json::json!({ "id": i + 1, "shopId": 1, "shopifyProductId": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/upsell"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(server)
            .await;
    }

    fn api(server: &MockServer, cart_id: Option<&str>) -> StorefrontCheckoutApi {
        let config = test_config(&format!("{}/graphql.json", server.uri()), &server.uri());
        StorefrontCheckoutApi::new(
            StorefrontClient::new(&config.shopify),
            UpsellApiClient::new(Url::parse(&server.uri()).unwrap()),
            config.shopify.store,
            cart_id.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_mount_resolves_normalized_ids() {
        let server = MockServer::start().await;
        mount_upsell_api(&server, &["7"]).await;
        Mock::given(method("POST"))
            .and(path("/graphql.json"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "ids": ["gid://shopify/Product/7"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "nodes": [ {
                    "id": "gid://shopify/Product/7",
                    "title": "Socks",
                    "featuredImage": null,
                    "variants": { "edges": [ { "node": {
                        "id": "gid://shopify/ProductVariant/70",
                        "price": { "amount": "5.00", "currencyCode": "USD" }
                    } } ] }
                } ] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let widget = UpsellWidget::new(api(&server, None));
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Ready);
        assert_eq!(widget.available(&[])[0].title, "Socks");
    }

    #[tokio::test]
    async fn test_mount_unknown_shop_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let widget = UpsellWidget::new(api(&server, None));
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn test_add_without_cart() {
        let server = MockServer::start().await;
        let err = api(&server, None)
            .add_cart_line("gid://shopify/ProductVariant/70")
            .await
            .unwrap_err();

        assert!(matches!(err, WidgetError::NoCart));
    }
}
