//! Shop session extractor.
//!
//! The app is installed on a single store whose Admin API token is part of the
//! configuration. The first request of a session records that store as the
//! current shop, creating its row on first contact.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_shop};
use crate::models::CurrentShop;
use crate::models::session::keys;
use crate::state::AppState;

/// Extractor yielding the authenticated shop for this session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ShopSession(shop): ShopSession) -> impl IntoResponse {
///     format!("Hello, {}!", shop.domain)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ShopSession(pub CurrentShop);

impl FromRequestParts<AppState> for ShopSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let configured = &state.config().shopify.store;

        if let Some(current) = session.get::<CurrentShop>(keys::CURRENT_SHOP).await?
            && &current.domain == configured
        {
            set_sentry_shop(current.id.as_i32(), current.domain.as_str());
            return Ok(Self(current));
        }

        let shop = state.store().find_or_create_shop(configured).await?;
        let current = CurrentShop {
            id: shop.id,
            domain: shop.shopify_domain,
        };
        session.insert(keys::CURRENT_SHOP, &current).await?;
        tracing::info!(shop_id = %current.id, shop_domain = %current.domain, "Shop session established");

        set_sentry_shop(current.id.as_i32(), current.domain.as_str());
        Ok(Self(current))
    }
}
