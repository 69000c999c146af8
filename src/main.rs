//! Acme basket pricing CLI
//!
//! Loads a fixture set, fills a basket from a named fixture basket or from the product
//! codes on the command line, and prints a receipt or a JSON summary.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use acme_basket::{fixtures::Fixture, receipt::Receipt, summary::BasketSummary};

use crate::config::Config;

mod config;

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|err| err.exit());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut fixture = Fixture::with_base_path(&config.fixtures_dir);

    fixture.load_set(&config.set).with_context(|| {
        format!(
            "failed to load fixture set {} from {}",
            config.set,
            config.fixtures_dir.display()
        )
    })?;

    let basket = match &config.basket {
        Some(name) => fixture.basket(name)?,
        None => fixture.basket_with(&config.codes)?,
    };

    info!(lines = basket.len(), "priced basket");

    let mut out = io::stdout().lock();

    if config.json {
        serde_json::to_writer_pretty(&mut out, &BasketSummary::from_basket(&basket)?)?;
        writeln!(out)?;
    } else {
        Receipt::from_basket(&basket)?.write_to(&mut out)?;
    }

    Ok(())
}
