//! Upsell selection page and form handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json, Router,
    extract::State,
    routing::get,
};
use tracing::instrument;

use crate::catalog::{CatalogProduct, fetch_catalog};
use crate::error::AppError;
use crate::middleware::ShopSession;
use crate::services::selection::{
    SelectionError, SelectionForm, SelectionSuccess, apply_selection, partition_catalog,
};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub price: String,
}

impl From<CatalogProduct> for ProductView {
    fn from(product: CatalogProduct) -> Self {
        Self {
            price: format!("${:.2}", product.price),
            id: product.id,
            title: product.title,
            image_url: product.image_url,
        }
    }
}

/// Upsell selection page template.
#[derive(Template, WebTemplate)]
#[template(path = "upsell/index.html")]
pub struct UpsellPageTemplate {
    pub shop_domain: String,
    pub has_shop: bool,
    pub available: Vec<ProductView>,
    pub selected: Vec<ProductView>,
    pub orphaned: Vec<String>,
}

/// Build the upsell router.
pub fn router() -> Router<AppState> {
    Router::new().route("/upsell", get(upsell_page).post(submit_selection))
}

/// Render the selection page.
///
/// The whole catalog is loaded before rendering; a shop with no row yet
/// simply has nothing selected.
#[instrument(skip(state, shop), fields(shop_domain = %shop.domain))]
async fn upsell_page(
    State(state): State<AppState>,
    ShopSession(shop): ShopSession,
) -> Result<UpsellPageTemplate, AppError> {
    let catalog = fetch_catalog(state.catalog()).await?;
    let existing = state.store().find_shop_by_domain(&shop.domain).await?;

    let partition = match &existing {
        Some(with_items) => partition_catalog(catalog, &with_items.selected_product_ids()),
        None => partition_catalog(catalog, &Default::default()),
    };

    if !partition.orphaned.is_empty() {
        tracing::warn!(
            orphaned = partition.orphaned.len(),
            "Selected products missing from catalog"
        );
    }

    Ok(UpsellPageTemplate {
        shop_domain: shop.domain.to_string(),
        has_shop: existing.is_some(),
        available: partition.available.into_iter().map(Into::into).collect(),
        selected: partition.selected.into_iter().map(Into::into).collect(),
        orphaned: partition.orphaned,
    })
}

/// Handle a save/delete submission.
///
/// Always answers with a JSON body, including when the shop session cannot
/// be established.
#[instrument(skip(state, shop, pairs), fields(shop_domain = tracing::field::Empty))]
async fn submit_selection(
    State(state): State<AppState>,
    shop: Result<ShopSession, AppError>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<SelectionSuccess>, SelectionError> {
    let ShopSession(shop) = shop.map_err(SelectionError::Session)?;
    tracing::Span::current().record("shop_domain", tracing::field::display(&shop.domain));

    let form = SelectionForm::from_pairs(pairs);
    apply_selection(state.store(), &shop.domain, form)
        .await
        .map(Json)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::db::UpsellStore;
    use crate::db::memory::MemoryStore;
    use crate::routes::test_support::{app, body_string, product};

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upsell")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_page_partitions_catalog() {
        let store = Arc::new(MemoryStore::new());
        let app = app(
            Arc::clone(&store),
            vec![product(1, "Lip Balm"), product(2, "Sunscreen")],
        );

        let response = app
            .clone()
            .oneshot(post_form("selectedProducts=gid%3A%2F%2Fshopify%2FProduct%2F2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/upsell").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        let available = html.find("Lip Balm").unwrap();
        let selected = html.find("Sunscreen").unwrap();
        assert!(html.contains("test.myshopify.com"));
        assert!(html[..selected].contains("id=\"available-products\""));
        assert!(html[available..].contains("id=\"selected-products\""));
    }

    #[tokio::test]
    async fn test_save_returns_success_json() {
        let store = Arc::new(MemoryStore::new());
        let app = app(Arc::clone(&store), vec![]);

        let response = app
            .oneshot(post_form(
                "intent=save&selectedProducts=p1&selectedProducts=p2&selectedProducts=p1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"success":"Saved 2 upsell product(s)"}"#
        );
        assert_eq!(store.items().len(), 2);
    }

    #[tokio::test]
    async fn test_save_without_products_is_bad_request() {
        let app = app(Arc::new(MemoryStore::new()), vec![]);

        let response = app.oneshot(post_form("intent=save")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"No products selected"}"#
        );
    }

    #[tokio::test]
    async fn test_delete_returns_removed_count() {
        let store = Arc::new(MemoryStore::new());
        let app = app(Arc::clone(&store), vec![]);

        app.clone()
            .oneshot(post_form("selectedProducts=p1&selectedProducts=p2"))
            .await
            .unwrap();
        let response = app
            .oneshot(post_form("intent=delete&selectedProducts=p1&selectedProducts=p9"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"success":"Removed 1 upsell product(s)"}"#
        );
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_is_generic_500() {
        let store = Arc::new(MemoryStore::new());
        let other = store.insert_shop("other.myshopify.com");
        store
            .create_upsell_items(other, &["p1".to_string()].into_iter().collect())
            .await
            .unwrap();
        let app = app(Arc::clone(&store), vec![]);

        let response = app
            .oneshot(post_form("selectedProducts=p1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"An error occurred while processing your request"}"#
        );
    }

    #[tokio::test]
    async fn test_session_failure_is_json_error() {
        let app = app(Arc::new(MemoryStore::failing()), vec![]);

        let response = app.oneshot(post_form("selectedProducts=p1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"An error occurred while processing your request"}"#
        );
    }
}
