//! TechSpec CLI - sitemap generation and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Write the sitemap (SITE_URL overrides the base URL)
//! ts-cli sitemap --out public/sitemap.xml
//!
//! # Import products from a CSV file (uses BACKEND_SERVICE_KEY)
//! ts-cli import products.csv
//!
//! # Type queries, one per line; results print as they settle
//! ts-cli search --spec network:5G
//!
//! # Show platform counters
//! ts-cli stats
//! ```
//!
//! # Commands
//!
//! - `sitemap` - Generate `sitemap.xml` from the product catalog
//! - `import` - Bulk product import from CSV
//! - `search` - Interactive debounced product search
//! - `stats` - Platform statistics

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::search::SearchOptions;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(author, version, about = "TechSpec CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the sitemap
    Sitemap {
        /// Output file
        #[arg(short, long, default_value = "public/sitemap.xml")]
        out: PathBuf,

        /// Public site URL
        #[arg(long, env = "SITE_URL")]
        site_url: Option<String>,
    },
    /// Import products from a CSV file
    Import {
        /// CSV file with a `name,brand,model,price` header
        file: PathBuf,
    },
    /// Search products interactively (one query per stdin line)
    Search {
        /// Brand substring applied to every query
        #[arg(short, long)]
        brand: Option<String>,

        /// Category slug applied to every query
        #[arg(short, long)]
        category: Option<String>,

        /// Specification term (`key:value` or bare), repeatable
        #[arg(short, long)]
        spec: Vec<String>,

        /// Quiet window in milliseconds (300 to 500)
        #[arg(long, default_value_t = 400)]
        debounce_ms: u64,
    },
    /// Show platform statistics
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Sitemap { out, site_url } => {
            commands::sitemap::generate(&out, site_url.as_deref()).await?;
        }
        Commands::Import { file } => {
            let summary = commands::import::from_file(&file).await?;
            if summary.imported == 0 && summary.failed > 0 {
                return Err("no rows were imported".into());
            }
        }
        Commands::Search {
            brand,
            category,
            spec,
            debounce_ms,
        } => {
            let options = SearchOptions {
                brand,
                category,
                spec,
                debounce: std::time::Duration::from_millis(debounce_ms),
            };
            commands::search::interactive(options).await?;
        }
        Commands::Stats => {
            commands::stats::show().await?;
        }
    }
    Ok(())
}
