//! Upsell repository backed by `PostgreSQL`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use checkout_upsell_core::{ShopDomain, ShopId, UpsellItemId};

use super::{RepositoryError, UpsellStore};
use crate::models::{Shop, ShopWithItems, UpsellItem};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    shopify_domain: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ShopRow> for Shop {
    type Error = RepositoryError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        let shopify_domain = ShopDomain::parse(&row.shopify_domain).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shop domain in database: {e}"))
        })?;

        Ok(Self {
            id: ShopId::new(row.id),
            shopify_domain,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpsellItemRow {
    id: i32,
    shop_id: i32,
    shopify_product_id: String,
}

impl From<UpsellItemRow> for UpsellItem {
    fn from(row: UpsellItemRow) -> Self {
        Self {
            id: UpsellItemId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            shopify_product_id: row.shopify_product_id,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for shop and upsell item database operations.
#[derive(Debug, Clone)]
pub struct UpsellRepository {
    pool: PgPool,
}

impl UpsellRepository {
    /// Create a new upsell repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn items_for_shop(&self, shop_id: ShopId) -> Result<Vec<UpsellItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, UpsellItemRow>(
            r"
            SELECT id, shop_id, shopify_product_id
            FROM admin.upsell_item
            WHERE shop_id = $1
            ORDER BY id
            ",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl UpsellStore for UpsellRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(shop_domain = %domain))]
    async fn find_shop_by_domain(
        &self,
        domain: &ShopDomain,
    ) -> Result<Option<ShopWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT id, shopify_domain, created_at
            FROM admin.shop
            WHERE shopify_domain = $1
            ",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let shop = Shop::try_from(row)?;
        let items = self.items_for_shop(shop.id).await?;

        Ok(Some(ShopWithItems { shop, items }))
    }

    #[instrument(skip(self), fields(shop_domain = %domain))]
    async fn find_or_create_shop(&self, domain: &ShopDomain) -> Result<Shop, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, ShopRow>(
            r"
            INSERT INTO admin.shop (shopify_domain)
            VALUES ($1)
            ON CONFLICT (shopify_domain) DO UPDATE SET shopify_domain = EXCLUDED.shopify_domain
            RETURNING id, shopify_domain, created_at
            ",
        )
        .bind(domain)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self, product_ids), fields(shop_id = %shop_id, count = product_ids.len()))]
    async fn create_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = 0;

        for product_id in product_ids {
            let result = sqlx::query(
                r"
                INSERT INTO admin.upsell_item (shop_id, shopify_product_id)
                VALUES ($1, $2)
                ",
            )
            .bind(shop_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(format!(
                        "product {product_id} is already selected"
                    ));
                }
                RepositoryError::Database(e)
            })?;
            created += result.rows_affected();
        }

        tx.commit().await?;

        Ok(created)
    }

    #[instrument(skip(self, product_ids), fields(shop_id = %shop_id, count = product_ids.len()))]
    async fn delete_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = product_ids.iter().cloned().collect();
        let result = sqlx::query(
            r"
            DELETE FROM admin.upsell_item
            WHERE shop_id = $1 AND shopify_product_id = ANY($2)
            ",
        )
        .bind(shop_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT id, shopify_domain, created_at
            FROM admin.shop
            ORDER BY created_at, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
