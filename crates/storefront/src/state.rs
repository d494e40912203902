//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::StorefrontConfig;
use crate::shopify::StorefrontClient;
use crate::upsell_api::UpsellApiClient;
use crate::widget::{StorefrontCheckoutApi, UpsellWidget};

/// A widget bound to one cart.
pub type CartWidget = UpsellWidget<StorefrontCheckoutApi>;

/// Cache key for visitors without a cart.
const ANONYMOUS_WIDGET: &str = "";

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    upsell_api: UpsellApiClient,
    widgets: Cache<String, Arc<CartWidget>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let upsell_api = UpsellApiClient::new(config.upsell_api_url.clone());
        let widgets = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(600)) // 10 minutes
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                upsell_api,
                widgets,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// The widget for `cart_id`, created on first use.
    ///
    /// Visitors without a cart share one widget. It can render offers but
    /// every add through it fails with `WidgetError::NoCart`.
    pub async fn widget_for(&self, cart_id: Option<&str>) -> Arc<CartWidget> {
        let key = cart_id.unwrap_or(ANONYMOUS_WIDGET).to_string();
        let api = StorefrontCheckoutApi::new(
            self.inner.storefront.clone(),
            self.inner.upsell_api.clone(),
            self.inner.config.shopify.store.clone(),
            cart_id.map(str::to_string),
        );

        self.inner
            .widgets
            .get_with(key, async move { Arc::new(UpsellWidget::new(api)) })
            .await
    }
}
