//! Writes a seeded sample extract for the ETL pipeline to load.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecomdw_datagen::{generate, write_csv, GeneratorConfig};

#[derive(Parser)]
#[command(
    name = "ecomdw-generate",
    version,
    about = "Generate sample e-commerce CSV extracts"
)]
struct Cli {
    /// Seed for the random generator; the same seed gives the same files.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 1000)]
    customers: usize,

    #[arg(long, default_value_t = 20)]
    products_per_subcategory: usize,

    #[arg(long, default_value_t = 15_000)]
    order_lines: usize,

    /// Output directory.
    #[arg(long, env = "ETL_DATA_DIR", default_value = "data/raw")]
    out: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GeneratorConfig {
        seed: cli.seed,
        customers: cli.customers,
        products_per_subcategory: cli.products_per_subcategory,
        order_lines: cli.order_lines,
        ..GeneratorConfig::default()
    };
    let data = generate(&config);
    let paths = write_csv(&cli.out, &data)
        .with_context(|| format!("Failed to write sample data to {}", cli.out.display()))?;

    tracing::info!(
        files = paths.len(),
        rows = data.total_rows(),
        out = %cli.out.display(),
        "Sample data generated"
    );
    Ok(())
}
