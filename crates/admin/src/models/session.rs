//! Session-related types for merchant authentication.

use serde::{Deserialize, Serialize};

use checkout_upsell_core::{ShopDomain, ShopId};

/// Session-stored shop identity.
///
/// Minimal data stored in the session to identify the authenticated merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentShop {
    /// Shop's database ID.
    pub id: ShopId,
    /// Shop's platform domain.
    pub domain: ShopDomain,
}

/// Session keys for merchant authentication data.
pub mod keys {
    /// Key for storing the current authenticated shop.
    pub const CURRENT_SHOP: &str = "current_shop";
}
