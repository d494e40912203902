//! Shop and upsell item models.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkout_upsell_core::{ShopDomain, ShopId, UpsellItemId};

/// A merchant shop that has installed the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub shopify_domain: ShopDomain,
    pub created_at: DateTime<Utc>,
}

/// A product chosen by a merchant to be offered as an upsell.
///
/// Serialized exactly as returned by the public upsell API:
/// `{ "id": 1, "shopId": 1, "shopifyProductId": "gid://shopify/Product/1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellItem {
    pub id: UpsellItemId,
    pub shop_id: ShopId,
    pub shopify_product_id: String,
}

/// A shop together with its current upsell selections, ordered by item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopWithItems {
    pub shop: Shop,
    pub items: Vec<UpsellItem>,
}

impl ShopWithItems {
    /// The set of product IDs currently selected for this shop.
    #[must_use]
    pub fn selected_product_ids(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .map(|item| item.shopify_product_id.as_str())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upsell_item_json_shape() {
        let item = UpsellItem {
            id: UpsellItemId::new(1),
            shop_id: ShopId::new(2),
            shopify_product_id: "gid://shopify/Product/3".to_string(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "shopId": 2,
                "shopifyProductId": "gid://shopify/Product/3"
            })
        );
    }

    #[test]
    fn test_selected_product_ids() {
        let shop = Shop {
            id: ShopId::new(1),
            shopify_domain: ShopDomain::parse("a.myshopify.com").unwrap(),
            created_at: Utc::now(),
        };
        let items = ["p2", "p1"]
            .iter()
            .enumerate()
            .map(|(i, p)| UpsellItem {
                id: UpsellItemId::new(i32::try_from(i).unwrap() + 1),
                shop_id: shop.id,
                shopify_product_id: (*p).to_string(),
            })
            .collect();
        let with_items = ShopWithItems { shop, items };

        let ids: Vec<_> = with_items.selected_product_ids().into_iter().collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
