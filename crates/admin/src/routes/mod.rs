//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check (main.rs)
//! GET  /health/ready           - Readiness check (main.rs)
//!
//! # Merchant app (shop session required)
//! GET  /                       - Redirect to /upsell
//! GET  /upsell                 - Upsell product selection page
//! POST /upsell                 - Save or remove selected products (JSON)
//!
//! # Public API (CORS: any origin)
//! GET  /api/upsell?shopDomain= - Upsell items for a shop
//! ```

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

pub mod api;
pub mod upsell;

/// Build the complete router for all admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/upsell") }))
        .merge(upsell::router())
        .merge(api::router())
}
