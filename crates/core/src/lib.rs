//! Checkout Upsell Core - Shared types library.
//!
//! This crate provides common types used across all Checkout Upsell components:
//! - `admin` - Merchant-facing selection screen and public upsell API
//! - `storefront` - Checkout upsell widget
//! - `cli` - Command-line tools for migrations and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, shop domains and product references

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
