mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ecomdw_engine::{CsvExtractor, LoaderSet, Pipeline, PipelineConfig, RunSummary};
use ecomdw_warehouse::{BackendKind, PostgresConnector, SqliteConnector};

#[derive(Parser)]
#[command(
    name = "ecomdw",
    version,
    about = "Load e-commerce CSV extracts into the star-schema warehouse",
    long_about = "Load e-commerce CSV extracts into the star-schema warehouse.\n\n\
                  Settings come from the environment (and a .env file, if present): \
                  DB_BACKEND, DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASSWORD, DB_SCHEMA, \
                  DB_PATH, ETL_DATA_DIR, ETL_BATCH_SIZE, ETL_LOG_FILE. RUST_LOG sets the \
                  log filter."
)]
struct Cli {}

const ENV_LOG_FILE: &str = "ETL_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "etl_pipeline.log";

/// Unset means the default file; set but empty turns file logging off.
fn log_file(value: Option<String>) -> Option<PathBuf> {
    match value {
        None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(PathBuf::from(v.trim())),
    }
}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    let log_path = log_file(std::env::var(ENV_LOG_FILE).ok());
    let _log_guard = logging::init("info", log_path.as_deref())?;

    let config = PipelineConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        warehouse = %config.warehouse.target(),
        data_dir = %config.data_dir.display(),
        batch_size = config.batch_size.get(),
        "Configuration loaded"
    );

    let extractor = CsvExtractor::new(config.data_dir.clone());
    let loaders = LoaderSet::standard(config.batch_size);
    let summary = match config.warehouse.backend {
        BackendKind::Postgres => {
            Pipeline::new(&config.warehouse, PostgresConnector, extractor, loaders).run()?
        }
        BackendKind::Sqlite { .. } => {
            Pipeline::new(&config.warehouse, SqliteConnector::Configured, extractor, loaders)
                .run()?
        }
    };

    print_summary(&summary)?;
    Ok(())
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("ETL pipeline completed successfully.");
    for load in &summary.tables {
        println!(
            "  {:<22} {:>10} rows  {:>8.3}s",
            load.table, load.rows, load.duration_secs
        );
    }
    println!("  Total rows:            {}", summary.total_rows());
    println!("  Duration:              {:.2}s", summary.duration_secs);
    println!(
        "{}",
        serde_json::to_string(summary).context("Failed to serialize run summary")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_defaults_and_opt_out() {
        assert_eq!(log_file(None), Some(PathBuf::from("etl_pipeline.log")));
        assert_eq!(log_file(Some(String::new())), None);
        assert_eq!(
            log_file(Some(" logs/run.log ".into())),
            Some(PathBuf::from("logs/run.log"))
        );
    }

    #[test]
    fn cli_accepts_no_arguments() {
        assert!(Cli::try_parse_from(["ecomdw"]).is_ok());
        assert!(Cli::try_parse_from(["ecomdw", "--batch-size", "5"]).is_err());
    }
}
