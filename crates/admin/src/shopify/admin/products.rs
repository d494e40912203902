//! Catalog paging over the Admin API product connection.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::catalog::{CatalogPage, CatalogPageSource, CatalogProduct};
use crate::shopify::AdminShopifyError;

use super::AdminClient;
use super::queries::{GetCatalogPage, get_catalog_page};

fn convert_product(
    product: get_catalog_page::Product,
) -> Result<CatalogProduct, AdminShopifyError> {
    let variant = product.variants.edges.into_iter().next().ok_or_else(|| {
        AdminShopifyError::Malformed(format!("product {} has no variants", product.id))
    })?;

    let price = Decimal::from_str(&variant.node.price).map_err(|e| {
        AdminShopifyError::Malformed(format!(
            "product {} has invalid price {:?}: {e}",
            product.id, variant.node.price
        ))
    })?;

    Ok(CatalogProduct {
        id: product.id,
        title: product.title,
        image_url: product.featured_image.map(|image| image.url),
        price,
    })
}

fn convert_page(data: get_catalog_page::ResponseData) -> Result<CatalogPage, AdminShopifyError> {
    let connection = data.products;
    let end_cursor = connection.edges.last().map(|edge| edge.cursor.clone());

    let products = connection
        .edges
        .into_iter()
        .map(|edge| convert_product(edge.node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CatalogPage {
        products,
        end_cursor,
        has_next_page: connection.page_info.has_next_page,
    })
}

#[async_trait]
impl CatalogPageSource for AdminClient {
    #[instrument(skip(self))]
    async fn fetch_page(
        &self,
        first: i64,
        after: Option<&str>,
    ) -> Result<CatalogPage, AdminShopifyError> {
        let data = self
            .execute::<GetCatalogPage>(get_catalog_page::Variables {
                first,
                after: after.map(String::from),
            })
            .await?;

        convert_page(data)
    }
}
