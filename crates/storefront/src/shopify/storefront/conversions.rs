//! Conversions from query response types into domain types.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use checkout_upsell_core::ProductGid;

use crate::shopify::types::{Cart, CartLine, Money, UpsellProduct};

use super::queries::{cart, get_products_by_ids};

/// Convert a `nodes` entry into an upsell product.
///
/// Returns `None` for non-product nodes and for products that cannot be
/// added to a cart (no variant or an unparseable price).
pub fn convert_product(node: get_products_by_ids::Node) -> Option<UpsellProduct> {
    let id = node.id?;
    let title = node.title?;

    let Some(variant) = node
        .variants
        .and_then(|v| v.edges.into_iter().next())
        .map(|e| e.node)
    else {
        warn!(product_id = %id, "Upsell product has no variants, skipping");
        return None;
    };

    let amount = match Decimal::from_str(&variant.price.amount) {
        Ok(amount) => amount,
        Err(e) => {
            warn!(product_id = %id, amount = %variant.price.amount, error = %e, "Invalid price, skipping");
            return None;
        }
    };

    Some(UpsellProduct {
        id: ProductGid::normalize(&id),
        title,
        image_url: node.featured_image.map(|i| i.url),
        price: Money {
            amount,
            currency_code: variant.price.currency_code,
        },
        variant_id: variant.id,
    })
}

pub fn convert_cart(cart: cart::Cart) -> Cart {
    Cart {
        id: cart.id,
        total_quantity: cart.total_quantity,
        lines: cart
            .lines
            .edges
            .into_iter()
            .map(|e| CartLine {
                id: e.node.id,
                merchandise_id: e.node.merchandise.id,
                quantity: e.node.quantity,
            })
            .collect(),
    }
}

/// Join mutation user errors into one message.
pub fn join_user_errors(errors: Vec<cart::UserError>) -> String {
    errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn node(value: serde_json::Value) -> get_products_by_ids::Node {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_convert_product_takes_first_variant() {
        let product = convert_product(node(serde_json::json!({
            "id": "gid://shopify/Product/1",
            "title": "Gift Wrap",
            "featuredImage": { "url": "https://cdn.shopify.com/wrap.png" },
            "variants": { "edges": [
                { "node": { "id": "gid://shopify/ProductVariant/10",
                            "price": { "amount": "4.5", "currencyCode": "USD" } } },
                { "node": { "id": "gid://shopify/ProductVariant/11",
                            "price": { "amount": "9.0", "currencyCode": "USD" } } }
            ] }
        })))
        .unwrap();

        assert_eq!(product.id.as_str(), "gid://shopify/Product/1");
        assert_eq!(product.variant_id, "gid://shopify/ProductVariant/10");
        assert_eq!(product.price.display(), "$4.50");
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.shopify.com/wrap.png")
        );
    }

    #[test]
    fn test_convert_product_skips_non_products() {
        assert!(convert_product(node(serde_json::json!({}))).is_none());
    }

    #[test]
    fn test_convert_product_skips_without_variants() {
        let product = convert_product(node(serde_json::json!({
            "id": "gid://shopify/Product/2",
            "title": "Bare",
            "variants": { "edges": [] }
        })));
        assert!(product.is_none());
    }
}
