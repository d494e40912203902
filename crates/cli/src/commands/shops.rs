//! Shop inspection commands.

use checkout_upsell_admin::db::{UpsellRepository, UpsellStore, create_pool};
use checkout_upsell_core::ShopDomain;

use super::{CommandError, admin_database_url};

async fn repository() -> Result<UpsellRepository, CommandError> {
    let database_url = admin_database_url()?;
    let pool = create_pool(&database_url).await?;
    Ok(UpsellRepository::new(pool))
}

/// Print every shop, oldest first.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), CommandError> {
    let repo = repository().await?;
    let shops = repo.list_shops().await?;

    #[allow(clippy::print_stdout)]
    {
        if shops.is_empty() {
            println!("No shops found.");
        }
        for shop in shops {
            println!(
                "{:>6}  {}  (since {})",
                shop.id,
                shop.shopify_domain,
                shop.created_at.format("%Y-%m-%d")
            );
        }
    }

    Ok(())
}

/// Print a shop's selected upsell product IDs.
///
/// # Errors
///
/// Returns an error if the domain is invalid, the shop does not exist, or
/// the database is unreachable.
pub async fn show(domain: &str) -> Result<(), CommandError> {
    let domain = ShopDomain::parse(domain)?;
    let repo = repository().await?;

    let shop = repo
        .find_shop_by_domain(&domain)
        .await?
        .ok_or_else(|| CommandError::ShopNotFound(domain.to_string()))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{} (id {})", shop.shop.shopify_domain, shop.shop.id);
        if shop.items.is_empty() {
            println!("  No upsell products selected.");
        }
        for item in &shop.items {
            println!("  {:>6}  {}", item.id, item.shopify_product_id);
        }
    }

    Ok(())
}
