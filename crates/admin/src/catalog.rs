//! Full product catalog retrieval.
//!
//! The merchant's selection page needs every product in the store. The Admin
//! API pages its product connection, so [`fetch_catalog`] follows the cursor
//! until `hasNextPage` is false and returns the whole catalog in API order.
//!
//! Pages are requested one after another. A failure on any page aborts the
//! whole fetch; no partial catalog is ever returned.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::shopify::AdminShopifyError;

/// Products requested per Admin API page (the API maximum).
pub const CATALOG_PAGE_SIZE: i64 = 250;

/// A product offered for upsell selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Product global ID.
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    /// Price of the product's first variant.
    pub price: Decimal,
}

/// One page of catalog products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub products: Vec<CatalogProduct>,
    /// Cursor of the last edge on this page, if any.
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Errors from catalog retrieval.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The Admin API failed or returned data the catalog cannot use.
    #[error("catalog upstream error: {0}")]
    Upstream(#[from] AdminShopifyError),
}

/// A paged source of catalog products.
#[async_trait]
pub trait CatalogPageSource: Send + Sync {
    /// Fetch up to `first` products after `after` (or from the start).
    async fn fetch_page(
        &self,
        first: i64,
        after: Option<&str>,
    ) -> Result<CatalogPage, AdminShopifyError>;
}

/// Fetch the complete catalog using [`CATALOG_PAGE_SIZE`] pages.
///
/// # Errors
///
/// Returns `CatalogError::Upstream` if any page request fails or is malformed.
pub async fn fetch_catalog(
    source: &dyn CatalogPageSource,
) -> Result<Vec<CatalogProduct>, CatalogError> {
    fetch_catalog_with_page_size(source, CATALOG_PAGE_SIZE).await
}

/// Fetch the complete catalog with an explicit page size.
///
/// # Errors
///
/// Returns `CatalogError::Upstream` if any page request fails, or if a page
/// claims more results without carrying a cursor to continue from.
#[instrument(skip(source))]
pub async fn fetch_catalog_with_page_size(
    source: &dyn CatalogPageSource,
    page_size: i64,
) -> Result<Vec<CatalogProduct>, CatalogError> {
    let mut products = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0_u32;

    loop {
        let page = source.fetch_page(page_size, cursor.as_deref()).await?;
        pages += 1;
        products.extend(page.products);

        if !page.has_next_page {
            break;
        }

        match page.end_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(AdminShopifyError::Malformed(
                    "page reports more results but has no edges".to_string(),
                )
                .into());
            }
        }
    }

    tracing::debug!(pages, products = products.len(), "Fetched catalog");

    Ok(products)
}
