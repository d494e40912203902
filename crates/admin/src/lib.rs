//! Checkout Upsell merchant app library.
//!
//! Serves the merchant-facing upsell selection page and the public upsell
//! API the storefront reads from.
//!
//! # Security
//!
//! This crate holds the Shopify Admin API access token for the installed app.
//! The public API only exposes product IDs a merchant chose to promote.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
