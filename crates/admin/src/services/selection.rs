//! Upsell selection: saving and removing a shop's chosen products.
//!
//! A submission names an intent and a list of product IDs. Duplicate IDs are
//! collapsed before the store is touched, and every successful submission
//! performs exactly one store mutation.

use std::collections::{BTreeSet, HashSet};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use checkout_upsell_core::ShopDomain;

use crate::catalog::CatalogProduct;
use crate::db::{RepositoryError, UpsellStore};
use crate::error::AppError;

/// Form field carrying the intent.
pub const INTENT_FIELD: &str = "intent";
/// Form field carrying a selected product ID (repeated).
pub const SELECTED_PRODUCTS_FIELD: &str = "selectedProducts";

/// What a submission asks the store to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionIntent {
    #[default]
    Save,
    Delete,
}

impl SelectionIntent {
    /// Parse the `intent` field. Anything other than `delete` means save.
    #[must_use]
    pub fn from_field(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("delete") => Self::Delete,
            _ => Self::Save,
        }
    }
}

/// A parsed selection submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionForm {
    pub intent: SelectionIntent,
    pub product_ids: BTreeSet<String>,
}

impl SelectionForm {
    /// Build a form from raw urlencoded pairs, which may repeat
    /// `selectedProducts`. Blank IDs are ignored.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut intent = None;
        let mut product_ids = BTreeSet::new();

        for (key, value) in pairs {
            match key.as_str() {
                INTENT_FIELD => intent = Some(value),
                SELECTED_PRODUCTS_FIELD => {
                    let id = value.trim();
                    if !id.is_empty() {
                        product_ids.insert(id.to_owned());
                    }
                }
                _ => {}
            }
        }

        Self {
            intent: SelectionIntent::from_field(intent.as_deref()),
            product_ids,
        }
    }
}

/// Successful submission result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSuccess {
    pub success: String,
}

impl SelectionSuccess {
    fn saved(count: u64) -> Self {
        Self {
            success: format!("Saved {count} upsell product(s)"),
        }
    }

    fn removed(count: u64) -> Self {
        Self {
            success: format!("Removed {count} upsell product(s)"),
        }
    }
}

/// Errors from a selection submission, rendered as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Shop not found: {0}")]
    ShopNotFound(ShopDomain),

    #[error("No products selected")]
    NoProductsSelected,

    #[error("An error occurred while processing your request")]
    Processing(#[source] RepositoryError),

    /// The shop session could not be established.
    #[error("An error occurred while processing your request")]
    Session(#[source] AppError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for SelectionError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ShopNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoProductsSelected => StatusCode::BAD_REQUEST,
            Self::Processing(source) => {
                let event_id = sentry::capture_error(source);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "Upsell selection failed"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Session(source) => {
                let event_id = sentry::capture_error(source);
                tracing::error!(
                    error = %source,
                    sentry_event_id = %event_id,
                    "Shop session unavailable for selection"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Apply a selection submission for `domain`.
///
/// # Errors
///
/// Checked in order: `ShopNotFound` if the shop does not exist,
/// `NoProductsSelected` for a save with no IDs, `Processing` if any store
/// call fails (including a product already selected elsewhere).
#[instrument(skip(store, form), fields(shop_domain = %domain, intent = ?form.intent, count = form.product_ids.len()))]
pub async fn apply_selection(
    store: &dyn UpsellStore,
    domain: &ShopDomain,
    form: SelectionForm,
) -> Result<SelectionSuccess, SelectionError> {
    let shop = store
        .find_shop_by_domain(domain)
        .await
        .map_err(SelectionError::Processing)?
        .ok_or_else(|| SelectionError::ShopNotFound(domain.clone()))?
        .shop;

    match form.intent {
        SelectionIntent::Save => {
            if form.product_ids.is_empty() {
                return Err(SelectionError::NoProductsSelected);
            }
            let count = store
                .create_upsell_items(shop.id, &form.product_ids)
                .await
                .map_err(SelectionError::Processing)?;
            tracing::info!(count, "Saved upsell products");
            Ok(SelectionSuccess::saved(count))
        }
        SelectionIntent::Delete => {
            let count = store
                .delete_upsell_items(shop.id, &form.product_ids)
                .await
                .map_err(SelectionError::Processing)?;
            tracing::info!(count, "Removed upsell products");
            Ok(SelectionSuccess::removed(count))
        }
    }
}

/// The catalog split by current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPartition {
    /// Products not yet selected, in catalog order.
    pub available: Vec<CatalogProduct>,
    /// Selected products still present in the catalog, in catalog order.
    pub selected: Vec<CatalogProduct>,
    /// Selected IDs that no longer match any catalog product.
    pub orphaned: Vec<String>,
}

/// Partition `catalog` into available and selected products.
#[must_use]
pub fn partition_catalog(
    catalog: Vec<CatalogProduct>,
    selected_ids: &BTreeSet<&str>,
) -> CatalogPartition {
    let catalog_ids: HashSet<String> = catalog.iter().map(|p| p.id.clone()).collect();
    let (selected, available): (Vec<_>, Vec<_>) = catalog
        .into_iter()
        .partition(|p| selected_ids.contains(p.id.as_str()));
    let orphaned = selected_ids
        .iter()
        .filter(|id| !catalog_ids.contains(**id))
        .map(|id| (*id).to_owned())
        .collect();

    CatalogPartition {
        available,
        selected,
        orphaned,
    }
}
