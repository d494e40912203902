//! Checkout Upsell CLI - Database migrations and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! upsell-cli migrate
//!
//! # List shops with their selection counts
//! upsell-cli shops list
//!
//! # Show one shop's selected upsell products
//! upsell-cli shops show your-store.myshopify.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "upsell-cli")]
#[command(author, version, about = "Checkout Upsell CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Inspect shops and their upsell selections
    Shops {
        #[command(subcommand)]
        action: ShopsAction,
    },
}

#[derive(Subcommand)]
enum ShopsAction {
    /// List all shops
    List,
    /// Show a shop's selected upsell products
    Show {
        /// Shop domain (e.g. your-store.myshopify.com)
        domain: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Shops { action } => match action {
            ShopsAction::List => commands::shops::list().await?,
            ShopsAction::Show { domain } => commands::shops::show(&domain).await?,
        },
    }
    Ok(())
}
