//! HTTP middleware for admin.
//!
//! - Session layer (tower-sessions with `PostgreSQL` store)
//! - Shop session extractor for merchant-facing routes

pub mod auth;
pub mod session;

pub use auth::ShopSession;
pub use session::create_session_layer;
