//! Public JSON API consumed by the storefront.
//!
//! Every response, errors and preflights included, allows any origin.

use axum::{Router, http::Method, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub mod upsell;

/// Build the public API router.
pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/upsell", get(upsell::list_upsell_items))
        .layer(cors)
}
