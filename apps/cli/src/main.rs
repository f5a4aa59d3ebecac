//! seoforge CLI: enrich a product catalog with generated descriptions and
//! images.
//!
//! Reads a `SKU,Name,Price` CSV and writes a storefront import catalog,
//! rewriting it after every product.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
