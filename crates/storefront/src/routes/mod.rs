//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health           - Liveness check (main.rs)
//! GET  /health/ready     - Readiness check (main.rs)
//!
//! # Checkout upsell widget (HTML fragments)
//! GET  /cart/upsell      - Upsell offers for the session's cart
//! POST /cart/upsell/add  - Add an offered product to the cart
//! ```

use axum::Router;

use crate::state::AppState;

pub mod upsell;

/// Build the complete router for all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(upsell::router())
}
