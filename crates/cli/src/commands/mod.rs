//! CLI command implementations.

pub mod migrate;
pub mod shops;

use secrecy::SecretString;

/// Errors shared by database-backed commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] checkout_upsell_admin::db::RepositoryError),

    #[error("Invalid shop domain: {0}")]
    InvalidDomain(#[from] checkout_upsell_core::ShopDomainError),

    #[error("Shop not found: {0}")]
    ShopNotFound(String),
}

/// The admin database URL, preferring `ADMIN_DATABASE_URL` over `DATABASE_URL`.
fn admin_database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("ADMIN_DATABASE_URL"))
}
