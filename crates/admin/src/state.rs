//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogPageSource;
use crate::config::AdminConfig;
use crate::db::UpsellStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store and catalog are trait objects so
/// that handlers can run against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn UpsellStore>,
    catalog: Arc<dyn CatalogPageSource>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin configuration
    /// * `store` - Shop and upsell item persistence
    /// * `catalog` - Paged product catalog (the Admin API client in production)
    #[must_use]
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn UpsellStore>,
        catalog: Arc<dyn CatalogPageSource>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the upsell store.
    #[must_use]
    pub fn store(&self) -> &dyn UpsellStore {
        self.inner.store.as_ref()
    }

    /// Get the catalog page source.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogPageSource {
        self.inner.catalog.as_ref()
    }
}
