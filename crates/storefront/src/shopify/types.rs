//! Domain types returned by the Storefront API client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use checkout_upsell_core::ProductGid;

/// A monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency_code: String,
}

impl Money {
    /// Format for display, e.g. `$12.50` or `12.50 EUR`.
    #[must_use]
    pub fn display(&self) -> String {
        if self.currency_code == "USD" {
            format!("${:.2}", self.amount)
        } else {
            format!("{:.2} {}", self.amount, self.currency_code)
        }
    }
}

/// A product resolved for upsell display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellProduct {
    pub id: ProductGid,
    pub title: String,
    pub image_url: Option<String>,
    /// Price of the first variant.
    pub price: Money,
    /// First variant, the one added to the cart.
    pub variant_id: String,
}

/// A line in a Shopify cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    /// Global ID of the product variant on this line.
    pub merchandise_id: String,
    pub quantity: i64,
}

/// A Shopify cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub total_quantity: i64,
    pub lines: Vec<CartLine>,
}
