//! `GET /api/upsell?shopDomain=` - a shop's upsell items.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use checkout_upsell_core::ShopDomain;

use crate::db::RepositoryError;
use crate::models::UpsellItem;
use crate::state::AppState;

/// Query parameters for the upsell lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellQuery {
    pub shop_domain: Option<String>,
}

/// Errors from the public upsell API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown, missing, or unparseable shop domain.
    #[error("Shop not found")]
    ShopNotFound,

    #[error("Internal server error")]
    Internal(#[source] RepositoryError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::ShopNotFound => (StatusCode::NOT_FOUND, "Shop not found"),
            Self::Internal(source) => {
                let event_id = sentry::capture_error(source);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "Upsell API lookup failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Return the shop's upsell items ordered by id, possibly empty.
///
/// A missing or malformed domain cannot name a shop and gets the same 404 as
/// an unknown one.
#[instrument(skip(state))]
pub async fn list_upsell_items(
    State(state): State<AppState>,
    Query(query): Query<UpsellQuery>,
) -> Result<Json<Vec<UpsellItem>>, ApiError> {
    let domain = query
        .shop_domain
        .as_deref()
        .and_then(|raw| ShopDomain::parse(raw).ok())
        .ok_or(ApiError::ShopNotFound)?;

    let shop = state
        .store()
        .find_shop_by_domain(&domain)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::ShopNotFound)?;

    Ok(Json(shop.items))
}
