//! Checkout upsell widget.
//!
//! Lifecycle: `Idle -> Loading -> {Empty, Ready}`. A successful load is
//! kept. A failed load ends in `Empty` and is only logged, and the next
//! `mount` tries again. Each product carries its own add state so one pending
//! add never blocks another.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an await.
//! Error banners dismiss themselves after [`BANNER_DISMISS_AFTER`]; a banner
//! shown later is not cleared by an earlier timer.

mod api;

pub use api::StorefrontCheckoutApi;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{instrument, warn};

use checkout_upsell_core::ProductGid;

use crate::shopify::{Cart, CartLine, ShopifyError, UpsellProduct};
use crate::upsell_api::UpsellApiError;

/// How long an error banner stays visible.
pub const BANNER_DISMISS_AFTER: Duration = Duration::from_secs(3);

/// Errors surfaced by widget collaborators.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Upsell API error: {0}")]
    UpsellApi(#[from] UpsellApiError),

    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    #[error("No cart to add to")]
    NoCart,

    #[error("Unknown upsell product: {0}")]
    UnknownProduct(ProductGid),

    #[error("Already adding upsell product: {0}")]
    AddInFlight(ProductGid),
}

/// External calls the widget depends on.
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Raw product IDs selected for this storefront's shop.
    async fn upsell_product_ids(&self) -> Result<Vec<String>, WidgetError>;

    /// Product details for the given IDs. Unresolvable IDs are omitted.
    async fn resolve_products(
        &self,
        ids: &[ProductGid],
    ) -> Result<Vec<UpsellProduct>, WidgetError>;

    /// Add one unit of `variant_id` to the cart.
    async fn add_cart_line(&self, variant_id: &str) -> Result<Cart, WidgetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    /// Nothing to offer, or loading failed.
    Empty,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddState {
    #[default]
    Idle,
    InFlight,
}

/// A transient error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    generation: u64,
}

#[derive(Debug)]
struct WidgetState {
    phase: Phase,
    /// Set when the last load failed; the next mount retries.
    load_failed: bool,
    products: Vec<UpsellProduct>,
    adding: HashMap<ProductGid, AddState>,
    banner: Option<Banner>,
    banner_generation: u64,
}

/// A product offered by the widget with its add state.
#[derive(Debug, Clone)]
pub struct OfferedProduct {
    pub product: UpsellProduct,
    pub add_state: AddState,
}

/// Render-ready snapshot of the widget.
#[derive(Debug, Clone)]
pub struct WidgetView {
    pub phase: Phase,
    pub products: Vec<OfferedProduct>,
    pub banner: Option<String>,
}

/// The checkout upsell widget for one cart.
pub struct UpsellWidget<A> {
    api: A,
    state: Arc<Mutex<WidgetState>>,
}

impl<A: CheckoutApi> std::fmt::Debug for UpsellWidget<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpsellWidget")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<A: CheckoutApi> UpsellWidget<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(WidgetState {
                phase: Phase::Idle,
                load_failed: false,
                products: Vec::new(),
                adding: HashMap::new(),
                banner: None,
                banner_generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Current banner message, if any.
    #[must_use]
    pub fn banner(&self) -> Option<String> {
        self.lock().banner.as_ref().map(|b| b.message.clone())
    }

    #[must_use]
    pub fn add_state(&self, product_id: &ProductGid) -> AddState {
        self.lock()
            .adding
            .get(product_id)
            .copied()
            .unwrap_or_default()
    }

    /// Load upsell products.
    ///
    /// Does nothing once a load has succeeded or while one is running. After
    /// a failed load the widget renders nothing until a later call succeeds.
    #[instrument(skip(self))]
    pub async fn mount(&self) {
        {
            let mut state = self.lock();
            let retry = state.phase == Phase::Empty && state.load_failed;
            if state.phase != Phase::Idle && !retry {
                return;
            }
            state.phase = Phase::Loading;
        }

        let (phase, products, load_failed) = match self.load().await {
            Ok(products) if products.is_empty() => (Phase::Empty, Vec::new(), false),
            Ok(products) => (Phase::Ready, products, false),
            Err(e) => {
                warn!(error = %e, "Failed to load upsell products");
                (Phase::Empty, Vec::new(), true)
            }
        };

        let mut state = self.lock();
        state.phase = phase;
        state.products = products;
        state.load_failed = load_failed;
    }

    async fn load(&self) -> Result<Vec<UpsellProduct>, WidgetError> {
        let ids: Vec<ProductGid> = self
            .api
            .upsell_product_ids()
            .await?
            .iter()
            .map(|raw| ProductGid::normalize(raw))
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.api.resolve_products(&ids).await
    }

    /// Products whose first variant is not already in the cart.
    ///
    /// Empty unless the widget is `Ready`.
    #[must_use]
    pub fn available(&self, cart_lines: &[CartLine]) -> Vec<UpsellProduct> {
        let state = self.lock();
        if state.phase != Phase::Ready {
            return Vec::new();
        }

        let in_cart: HashSet<&str> = cart_lines
            .iter()
            .map(|line| line.merchandise_id.as_str())
            .collect();

        state
            .products
            .iter()
            .filter(|p| !in_cart.contains(p.variant_id.as_str()))
            .cloned()
            .collect()
    }

    /// Snapshot for rendering against the given cart.
    #[must_use]
    pub fn view(&self, cart_lines: &[CartLine]) -> WidgetView {
        let products = self
            .available(cart_lines)
            .into_iter()
            .map(|product| {
                let add_state = self.add_state(&product.id);
                OfferedProduct { product, add_state }
            })
            .collect();

        let state = self.lock();
        WidgetView {
            phase: state.phase,
            products,
            banner: state.banner.as_ref().map(|b| b.message.clone()),
        }
    }

    /// Add one unit of the product's first variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns `WidgetError::UnknownProduct` if the widget does not offer the
    /// product and `WidgetError::AddInFlight` if an add for it is already
    /// pending. Any failure from the cart call is returned after an error
    /// banner has been shown.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductGid) -> Result<Cart, WidgetError> {
        let product = {
            let mut state = self.lock();
            let product = state
                .products
                .iter()
                .find(|p| &p.id == product_id)
                .cloned()
                .ok_or_else(|| WidgetError::UnknownProduct(product_id.clone()))?;
            if state.adding.get(product_id) == Some(&AddState::InFlight) {
                return Err(WidgetError::AddInFlight(product_id.clone()));
            }
            state.adding.insert(product_id.clone(), AddState::InFlight);
            product
        };

        let result = self.api.add_cart_line(&product.variant_id).await;

        self.lock().adding.insert(product_id.clone(), AddState::Idle);

        if let Err(e) = &result {
            warn!(error = %e, "Failed to add upsell product to cart");
            self.show_banner(format!(
                "Couldn't add {} to your cart. Please try again.",
                product.title
            ));
        }

        result
    }

    fn show_banner(&self, message: String) {
        let generation = {
            let mut state = self.lock();
            state.banner_generation += 1;
            let generation = state.banner_generation;
            state.banner = Some(Banner {
                message,
                generation,
            });
            generation
        };

        let deadline = Instant::now() + BANNER_DISMISS_AFTER;
        let state = Arc::downgrade(&self.state);
        tokio::spawn(dismiss_banner_at(state, generation, deadline));
    }
}

async fn dismiss_banner_at(state: Weak<Mutex<WidgetState>>, generation: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if state
        .banner
        .as_ref()
        .is_some_and(|b| b.generation == generation)
    {
        state.banner = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use super::*;
    use crate::shopify::Money;

    fn product(id: u64, variant: u64) -> UpsellProduct {
        UpsellProduct {
            id: ProductGid::normalize(&id.to_string()),
            title: format!("Product {id}"),
            image_url: None,
            price: Money {
                amount: Decimal::new(1000, 2),
                currency_code: "USD".to_string(),
            },
            variant_id: format!("gid://shopify/ProductVariant/{variant}"),
        }
    }

    fn line(variant: u64) -> CartLine {
        CartLine {
            id: format!("gid://shopify/CartLine/{variant}"),
            merchandise_id: format!("gid://shopify/ProductVariant/{variant}"),
            quantity: 1,
        }
    }

    fn empty_cart() -> Cart {
        Cart {
            id: "gid://shopify/Cart/test".to_string(),
            total_quantity: 0,
            lines: Vec::new(),
        }
    }

    #[derive(Default)]
    struct FakeApi {
        ids: Vec<String>,
        products: Vec<UpsellProduct>,
        fail_ids: AtomicBool,
        fail_add: bool,
        /// Variant whose add blocks until notified.
        gate: Option<(String, Arc<Notify>)>,
        resolve_calls: AtomicUsize,
        requested: Mutex<Vec<ProductGid>>,
    }

    #[async_trait]
    impl CheckoutApi for FakeApi {
        async fn upsell_product_ids(&self) -> Result<Vec<String>, WidgetError> {
            if self.fail_ids.load(Ordering::SeqCst) {
                return Err(WidgetError::UpsellApi(UpsellApiError::Status(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                )));
            }
            Ok(self.ids.clone())
        }

        async fn resolve_products(
            &self,
            ids: &[ProductGid],
        ) -> Result<Vec<UpsellProduct>, WidgetError> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().extend_from_slice(ids);
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        async fn add_cart_line(&self, variant_id: &str) -> Result<Cart, WidgetError> {
            if let Some((gated, notify)) = &self.gate
                && gated == variant_id
            {
                notify.notified().await;
            }
            if self.fail_add {
                return Err(WidgetError::Shopify(ShopifyError::UserError(
                    "Merchandise is sold out".to_string(),
                )));
            }
            Ok(empty_cart())
        }
    }

    fn ready_api() -> FakeApi {
        FakeApi {
            ids: vec!["1".to_string(), "gid://shopify/Product/2".to_string()],
            products: vec![product(1, 10), product(2, 20)],
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn test_mount_normalizes_ids_and_becomes_ready() {
        let widget = UpsellWidget::new(ready_api());
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Ready);
        let requested = widget.api.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![ProductGid::normalize("1"), ProductGid::normalize("2")]
        );
    }

    #[tokio::test]
    async fn test_mount_runs_once() {
        let widget = UpsellWidget::new(ready_api());
        widget.mount().await;
        widget.mount().await;

        assert_eq!(widget.api.resolve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mount_without_ids_is_empty() {
        let widget = UpsellWidget::new(FakeApi::default());
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Empty);
        assert_eq!(widget.api.resolve_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mount_fails_open() {
        let widget = UpsellWidget::new(FakeApi {
            fail_ids: AtomicBool::new(true),
            ..ready_api()
        });
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Empty);
        assert!(widget.available(&[]).is_empty());
        assert!(widget.banner().is_none());
    }

    #[tokio::test]
    async fn test_mount_retries_after_failed_load() {
        let widget = UpsellWidget::new(FakeApi {
            fail_ids: AtomicBool::new(true),
            ..ready_api()
        });
        widget.mount().await;
        assert_eq!(widget.phase(), Phase::Empty);

        widget.api.fail_ids.store(false, Ordering::SeqCst);
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Ready);
        assert_eq!(widget.available(&[]).len(), 2);

        // A successful load sticks
        widget.mount().await;
        assert_eq!(widget.api.resolve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_empty_load_is_kept() {
        let widget = UpsellWidget::new(FakeApi::default());
        widget.mount().await;
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Empty);
        assert_eq!(widget.api.resolve_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mount_with_unresolvable_ids_is_empty() {
        let widget = UpsellWidget::new(FakeApi {
            ids: vec!["999".to_string()],
            products: vec![product(1, 10)],
            ..FakeApi::default()
        });
        widget.mount().await;

        assert_eq!(widget.phase(), Phase::Empty);
    }

    #[test]
    fn test_available_empty_before_mount() {
        let widget = UpsellWidget::new(ready_api());
        assert_eq!(widget.phase(), Phase::Idle);
        assert!(widget.available(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_available_filters_products_in_cart() {
        let widget = UpsellWidget::new(ready_api());
        widget.mount().await;

        let available = widget.available(&[line(10)]);
        let ids: Vec<_> = available.iter().map(|p| p.id.resource_id()).collect();
        assert_eq!(ids, vec!["2"]);

        // Recomputed per call
        assert_eq!(widget.available(&[]).len(), 2);
        assert!(widget.available(&[line(10), line(20)]).is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let widget = UpsellWidget::new(ready_api());
        widget.mount().await;

        let err = widget
            .add_to_cart(&ProductGid::normalize("999"))
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::UnknownProduct(_)));
        assert!(widget.banner().is_none());
    }

    #[tokio::test]
    async fn test_pending_add_does_not_block_other_products() {
        let notify = Arc::new(Notify::new());
        let widget = Arc::new(UpsellWidget::new(FakeApi {
            gate: Some((
                "gid://shopify/ProductVariant/10".to_string(),
                Arc::clone(&notify),
            )),
            ..ready_api()
        }));
        widget.mount().await;

        let a = ProductGid::normalize("1");
        let b = ProductGid::normalize("2");

        let pending = tokio::spawn({
            let widget = Arc::clone(&widget);
            let a = a.clone();
            async move { widget.add_to_cart(&a).await }
        });
        while widget.add_state(&a) != AddState::InFlight {
            tokio::task::yield_now().await;
        }

        assert_eq!(widget.add_state(&b), AddState::Idle);
        widget.add_to_cart(&b).await.unwrap();
        assert_eq!(widget.add_state(&b), AddState::Idle);
        assert_eq!(widget.add_state(&a), AddState::InFlight);

        notify.notify_one();
        pending.await.unwrap().unwrap();
        assert_eq!(widget.add_state(&a), AddState::Idle);
    }

    #[tokio::test]
    async fn test_repeated_press_while_pending_is_rejected() {
        let notify = Arc::new(Notify::new());
        let widget = Arc::new(UpsellWidget::new(FakeApi {
            gate: Some((
                "gid://shopify/ProductVariant/10".to_string(),
                Arc::clone(&notify),
            )),
            ..ready_api()
        }));
        widget.mount().await;

        let a = ProductGid::normalize("1");
        let pending = tokio::spawn({
            let widget = Arc::clone(&widget);
            let a = a.clone();
            async move { widget.add_to_cart(&a).await }
        });
        while widget.add_state(&a) != AddState::InFlight {
            tokio::task::yield_now().await;
        }

        let err = widget.add_to_cart(&a).await.unwrap_err();
        assert!(matches!(err, WidgetError::AddInFlight(_)));
        assert_eq!(widget.add_state(&a), AddState::InFlight);
        assert!(widget.banner().is_none());

        notify.notify_one();
        pending.await.unwrap().unwrap();
        assert_eq!(widget.add_state(&a), AddState::Idle);
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_dismissed_after_three_seconds() {
        let widget = UpsellWidget::new(FakeApi {
            fail_add: true,
            ..ready_api()
        });
        widget.mount().await;

        let result = widget.add_to_cart(&ProductGid::normalize("1")).await;
        assert!(result.is_err());
        assert_eq!(widget.add_state(&ProductGid::normalize("1")), AddState::Idle);
        assert_eq!(
            widget.banner().as_deref(),
            Some("Couldn't add Product 1 to your cart. Please try again.")
        );

        tokio::time::advance(Duration::from_millis(2999)).await;
        settle().await;
        assert!(widget.banner().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert!(widget.banner().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_banner_outlives_older_timer() {
        let widget = UpsellWidget::new(FakeApi {
            fail_add: true,
            ..ready_api()
        });
        widget.mount().await;

        let _ = widget.add_to_cart(&ProductGid::normalize("1")).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        let _ = widget.add_to_cart(&ProductGid::normalize("2")).await;

        // First timer fires; second banner stays
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(
            widget.banner().as_deref(),
            Some("Couldn't add Product 2 to your cart. Please try again.")
        );

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(widget.banner().is_none());
    }
}
