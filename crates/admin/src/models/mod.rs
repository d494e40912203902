//! Domain models for admin.

pub mod session;
pub mod upsell;

pub use session::CurrentShop;
pub use upsell::{Shop, ShopWithItems, UpsellItem};
