//! CLI configuration module

use std::path::PathBuf;

use clap::Parser;

/// Acme basket pricing configuration
#[derive(Debug, Parser)]
#[command(name = "acme-basket", about = "Price a basket of Acme widgets", long_about = None)]
pub struct Config {
    /// Directory holding the products, delivery, offers and baskets fixtures
    #[arg(short = 'd', long, env = "ACME_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set to load
    #[arg(short, long, env = "ACME_FIXTURE_SET", default_value = "acme")]
    pub set: String,

    /// Named basket from the fixture set
    #[arg(short, long, conflicts_with = "codes")]
    pub basket: Option<String>,

    /// Product codes to add, in order
    pub codes: Vec<String>,

    /// Print a JSON summary instead of a receipt
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
