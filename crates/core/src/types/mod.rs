//! Core types for Checkout Upsell.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod product_gid;
pub mod shop_domain;

pub use id::*;
pub use product_gid::ProductGid;
pub use shop_domain::{ShopDomain, ShopDomainError};
