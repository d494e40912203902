//! Checkout upsell widget fragments.
//!
//! Both routes return the widget as an HTML fragment for HTMX to swap in.
//! Upsell loading failures render nothing rather than an error.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use checkout_upsell_core::ProductGid;

use crate::error::AppError;
use crate::models::session_keys;
use crate::shopify::{CartLine, ShopifyError};
use crate::state::AppState;
use crate::widget::{AddState, WidgetError, WidgetView};

/// Offer display data for templates.
#[derive(Debug, Clone)]
pub struct OfferView {
    pub product_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub price: String,
    pub pending: bool,
}

/// Upsell widget fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/upsell_widget.html")]
pub struct UpsellWidgetTemplate {
    pub offers: Vec<OfferView>,
    pub banner: Option<String>,
}

impl From<WidgetView> for UpsellWidgetTemplate {
    fn from(view: WidgetView) -> Self {
        Self {
            offers: view
                .products
                .into_iter()
                .map(|offer| OfferView {
                    product_id: offer.product.id.to_string(),
                    title: offer.product.title,
                    image_url: offer.product.image_url,
                    price: offer.product.price.display(),
                    pending: offer.add_state == AddState::InFlight,
                })
                .collect(),
            banner: view.banner,
        }
    }
}

/// Add upsell form data.
#[derive(Debug, Deserialize)]
pub struct AddUpsellForm {
    pub product_id: String,
}

/// Build the upsell widget router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart/upsell", get(show))
        .route("/cart/upsell/add", post(add))
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// The session's cart ID and its lines.
///
/// A cart Shopify no longer knows is dropped from the session. Other lookup
/// failures keep the ID and render as if the cart were empty.
async fn current_cart(state: &AppState, session: &Session) -> (Option<String>, Vec<CartLine>) {
    let Some(cart_id) = get_cart_id(session).await else {
        return (None, Vec::new());
    };

    match state.storefront().get_cart(&cart_id).await {
        Ok(cart) => (Some(cart.id), cart.lines),
        Err(ShopifyError::NotFound(_)) => {
            if let Err(e) = session.remove::<String>(session_keys::CART_ID).await {
                tracing::warn!(error = %e, "Failed to clear expired cart from session");
            }
            (None, Vec::new())
        }
        Err(e) => {
            tracing::warn!(cart_id = %cart_id, error = %e, "Failed to fetch cart");
            (Some(cart_id), Vec::new())
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Render upsell offers for the session's cart.
#[instrument(skip(state, session))]
async fn show(State(state): State<AppState>, session: Session) -> UpsellWidgetTemplate {
    let (cart_id, lines) = current_cart(&state, &session).await;

    let widget = state.widget_for(cart_id.as_deref()).await;
    widget.mount().await;

    widget.view(&lines).into()
}

/// Add an offered product to the cart, creating the cart if needed.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddUpsellForm>,
) -> Result<UpsellWidgetTemplate, AppError> {
    let product_id = ProductGid::normalize(&form.product_id);
    let (cart_id, lines) = current_cart(&state, &session).await;

    let cart_id = match cart_id {
        Some(cart_id) => cart_id,
        None => {
            let cart = state.storefront().create_cart().await?;
            session.insert(session_keys::CART_ID, &cart.id).await?;
            cart.id
        }
    };

    let widget = state.widget_for(Some(&cart_id)).await;
    widget.mount().await;

    let lines = match widget.add_to_cart(&product_id).await {
        Ok(cart) => cart.lines,
        Err(WidgetError::UnknownProduct(id)) => {
            return Err(AppError::BadRequest(format!(
                "Unknown upsell product: {id}"
            )));
        }
        // Cart failures show a banner; a pending add renders as in flight
        Err(_) => lines,
    };

    Ok(widget.view(&lines).into())
}
