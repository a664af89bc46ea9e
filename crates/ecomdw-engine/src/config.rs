//! Pipeline configuration resolved once at startup.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use ecomdw_warehouse::WarehouseConfig;

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::error::ConfigError;

pub const ENV_DATA_DIR: &str = "ETL_DATA_DIR";
pub const ENV_BATCH_SIZE: &str = "ETL_BATCH_SIZE";

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

/// Everything a run needs: where to load, where to read, how big a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub warehouse: WarehouseConfig,
    /// Directory holding `<source>.csv` files.
    pub data_dir: PathBuf,
    pub batch_size: NonZeroUsize,
}

impl PipelineConfig {
    /// Resolve through `lookup`; unset or empty variables take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid warehouse settings or a batch
    /// size that is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let warehouse = WarehouseConfig::from_lookup(&lookup)?;
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let batch_size = match get(ENV_BATCH_SIZE) {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: ENV_BATCH_SIZE,
                    value: raw.clone(),
                    reason: format!("must be a positive integer ({e})"),
                })?,
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(Self {
            warehouse,
            data_dir: get(ENV_DATA_DIR).map_or_else(default_data_dir, PathBuf::from),
            batch_size,
        })
    }

    /// Resolve from the process environment.
    ///
    /// # Errors
    ///
    /// See [`PipelineConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ecomdw_warehouse::BackendKind;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[("DB_USER", "etl")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data/raw"));
        assert_eq!(config.batch_size.get(), 1000);
        assert_eq!(config.warehouse.backend, BackendKind::Postgres);
    }

    #[test]
    fn overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("ETL_DATA_DIR", "/srv/extracts"),
            ("ETL_BATCH_SIZE", "250"),
            ("DB_BACKEND", "sqlite"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/extracts"));
        assert_eq!(config.batch_size.get(), 250);
        assert!(matches!(config.warehouse.backend, BackendKind::Sqlite { .. }));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = PipelineConfig::from_lookup(lookup(&[("ETL_BATCH_SIZE", "0")])).unwrap_err();
        assert!(err.to_string().contains("ETL_BATCH_SIZE"), "got: {err}");
    }

    #[test]
    fn non_numeric_batch_size_is_rejected() {
        assert!(PipelineConfig::from_lookup(lookup(&[("ETL_BATCH_SIZE", "lots")])).is_err());
    }

    #[test]
    fn warehouse_errors_pass_through() {
        let err = PipelineConfig::from_lookup(lookup(&[("DB_PORT", "99999")])).unwrap_err();
        assert!(matches!(err, ConfigError::Warehouse(_)));
    }
}
