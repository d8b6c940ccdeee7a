//! StyleVault CLI - Chat with the AI shopkeeper and inspect the catalog.
//!
//! # Usage
//!
//! ```bash
//! # Interactive chat with the clerk (needs GROQ_API_KEY in env or .env)
//! sv-cli chat
//!
//! # Search the catalog without the model
//! sv-cli search "something for the beach" --limit 5
//!
//! # List the catalog
//! sv-cli catalog
//!
//! # Use a custom catalog file
//! sv-cli --catalog ./my-products.json chat
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use stylevault_core::Catalog;

mod commands;

/// Demo catalog bundled with the binary.
const DEMO_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Parser)]
#[command(name = "sv-cli")]
#[command(author, version, about = "StyleVault AI shopkeeper CLI")]
struct Cli {
    /// Path to a catalog JSON file (defaults to the bundled demo catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the clerk in an interactive REPL
    Chat,
    /// Search the catalog with the local semantic engine
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 4)]
        limit: usize,
    },
    /// List all catalog products
    Catalog,
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
    let catalog = load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Chat => commands::chat::run(catalog).await?,
        Commands::Search { query, limit } => commands::search::run(&catalog, &query, limit),
        Commands::Catalog => commands::catalog::run(&catalog),
    }
    Ok(())
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<Catalog, Box<dyn std::error::Error>> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(p)?,
        None => DEMO_CATALOG.to_string(),
    };
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_parses() {
        let catalog = load_catalog(None).expect("bundled catalog");
        assert!(!catalog.is_empty());
        assert!(catalog.in_stock().count() < catalog.len());
    }
}
