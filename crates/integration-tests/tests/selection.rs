//! Database tests for the save/delete selection flow.
//!
//! Run with: cargo test -p checkout-upsell-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use checkout_upsell_admin::db::UpsellStore;
use checkout_upsell_admin::services::selection::{
    SelectionError, SelectionForm, apply_selection,
};
use checkout_upsell_integration_tests::{test_repository, unique_domain, unique_product_id};

fn form(intent: &str, products: &[&str]) -> SelectionForm {
    let mut pairs = vec![("intent".to_string(), intent.to_string())];
    pairs.extend(
        products
            .iter()
            .map(|p| ("selectedProducts".to_string(), (*p).to_string())),
    );
    SelectionForm::from_pairs(pairs)
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_save_then_delete() {
    let repo = test_repository().await;
    let domain = unique_domain();
    repo.find_or_create_shop(&domain).await.unwrap();
    let (a, b) = (unique_product_id(), unique_product_id());

    let saved = apply_selection(&repo, &domain, form("save", &[&a, &b]))
        .await
        .unwrap();
    assert_eq!(saved.success, "Saved 2 upsell product(s)");

    apply_selection(&repo, &domain, form("delete", &[&a]))
        .await
        .unwrap();

    let with_items = repo.find_shop_by_domain(&domain).await.unwrap().unwrap();
    let remaining: Vec<_> = with_items
        .items
        .iter()
        .map(|i| i.shopify_product_id.as_str())
        .collect();
    assert_eq!(remaining, vec![b.as_str()]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_save_for_unknown_shop() {
    let repo = test_repository().await;

    let err = apply_selection(&repo, &unique_domain(), form("save", &["1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SelectionError::ShopNotFound(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_save_already_selected_product_is_processing_error() {
    let repo = test_repository().await;
    let domain = unique_domain();
    repo.find_or_create_shop(&domain).await.unwrap();
    let product = unique_product_id();

    apply_selection(&repo, &domain, form("save", &[&product]))
        .await
        .unwrap();
    let err = apply_selection(&repo, &domain, form("save", &[&product]))
        .await
        .unwrap_err();

    assert!(matches!(err, SelectionError::Processing(_)));
}
