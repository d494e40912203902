//! Checkout Upsell storefront library.
//!
//! Hosts the checkout upsell widget: offers come from the merchant app's
//! public upsell API, product details and cart changes from the Shopify
//! Storefront API.
//!
//! # Security
//!
//! This crate only holds the private Storefront API token. It has no access
//! to the Admin API or the merchant app's database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod upsell_api;
pub mod widget;
