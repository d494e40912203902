//! In-memory `UpsellStore` for handler tests.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use checkout_upsell_core::{ShopDomain, ShopId, UpsellItemId};

use super::{RepositoryError, UpsellStore};
use crate::models::{Shop, ShopWithItems, UpsellItem};

#[derive(Debug, Default)]
struct Tables {
    shops: Vec<Shop>,
    items: Vec<UpsellItem>,
    next_item_id: i32,
}

/// Mirrors the `PostgreSQL` constraints: product ids are unique across all
/// shops and a batch insert is all or nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with a database error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_shop(domain: &str) -> (Self, ShopId) {
        let store = Self::new();
        let id = store.insert_shop(domain);
        (store, id)
    }

    pub fn insert_shop(&self, domain: &str) -> ShopId {
        let mut tables = self.lock();
        let id = ShopId::new(i32::try_from(tables.shops.len()).unwrap_or(i32::MAX) + 1);
        tables.shops.push(Shop {
            id,
            shopify_domain: ShopDomain::parse(domain).unwrap_or_else(|e| panic!("{e}")),
            created_at: Utc::now(),
        });
        id
    }

    pub fn items(&self) -> Vec<UpsellItem> {
        self.lock().items.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UpsellStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }

    async fn find_shop_by_domain(
        &self,
        domain: &ShopDomain,
    ) -> Result<Option<ShopWithItems>, RepositoryError> {
        self.check()?;
        let tables = self.lock();
        Ok(tables
            .shops
            .iter()
            .find(|s| &s.shopify_domain == domain)
            .map(|shop| ShopWithItems {
                shop: shop.clone(),
                items: tables
                    .items
                    .iter()
                    .filter(|i| i.shop_id == shop.id)
                    .cloned()
                    .collect(),
            }))
    }

    async fn find_or_create_shop(&self, domain: &ShopDomain) -> Result<Shop, RepositoryError> {
        self.check()?;
        if let Some(existing) = self
            .lock()
            .shops
            .iter()
            .find(|s| &s.shopify_domain == domain)
        {
            return Ok(existing.clone());
        }
        let id = self.insert_shop(domain.as_str());
        let tables = self.lock();
        tables
            .shops
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError> {
        self.check()?;
        let mut tables = self.lock();
        if let Some(taken) = product_ids
            .iter()
            .find(|p| tables.items.iter().any(|i| &i.shopify_product_id == *p))
        {
            return Err(RepositoryError::Conflict(format!(
                "product {taken} is already selected"
            )));
        }
        for product_id in product_ids {
            tables.next_item_id += 1;
            let id = UpsellItemId::new(tables.next_item_id);
            tables.items.push(UpsellItem {
                id,
                shop_id,
                shopify_product_id: product_id.clone(),
            });
        }
        Ok(product_ids.len() as u64)
    }

    async fn delete_upsell_items(
        &self,
        shop_id: ShopId,
        product_ids: &BTreeSet<String>,
    ) -> Result<u64, RepositoryError> {
        self.check()?;
        let mut tables = self.lock();
        let before = tables.items.len();
        tables
            .items
            .retain(|i| !(i.shop_id == shop_id && product_ids.contains(&i.shopify_product_id)));
        Ok((before - tables.items.len()) as u64)
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        self.check()?;
        Ok(self.lock().shops.clone())
    }
}
