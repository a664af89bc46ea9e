//! Pipeline error model.
//!
//! Each stage has its own error type; [`PipelineError`] gathers them into
//! the five failure kinds a run can end with, and [`RunError`] adds the
//! stage the run was in when it failed.

use std::path::PathBuf;

use ecomdw_warehouse::WarehouseError;

use crate::orchestrator::RunState;

/// Invalid or unsupported configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}='{value}' is invalid: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// Source data could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The named source does not exist.
    #[error("source '{source_name}' not found at {}", .path.display())]
    NotFound { source_name: String, path: PathBuf },

    /// The source exists but is not well-formed CSV.
    #[error("source '{source_name}' is malformed: {detail}")]
    Format { source_name: String, detail: String },
}

/// A row or table violates the rules for its entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity}{}: {message}", .row.map(|r| format!(" row {r}")).unwrap_or_default())]
pub struct ValidationError {
    pub entity: &'static str,
    /// 1-based data row number, when the problem is tied to one row.
    pub row: Option<usize>,
    pub message: String,
}

impl ValidationError {
    pub fn table(entity: &'static str, message: impl Into<String>) -> Self {
        Self {
            entity,
            row: None,
            message: message.into(),
        }
    }

    pub fn row(entity: &'static str, row: usize, message: impl Into<String>) -> Self {
        Self {
            entity,
            row: Some(row),
            message: message.into(),
        }
    }
}

/// A loader could not write its table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Rows were rejected before anything was sent to the warehouse.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An insert (or its commit) failed; the call's transaction was rolled back.
    #[error("insert into {table} failed at rows {first_row}..={last_row}: {source}")]
    Insert {
        table: &'static str,
        first_row: usize,
        last_row: usize,
        #[source]
        source: WarehouseError,
    },

    /// Every statement succeeded but the commit did not; rolled back.
    #[error("commit of {rows} rows into {table} failed: {source}")]
    Commit {
        table: &'static str,
        rows: usize,
        #[source]
        source: WarehouseError,
    },

    /// Clearing the table failed; the transaction was rolled back.
    #[error("truncate of {table} failed: {source}")]
    Truncate {
        table: &'static str,
        #[source]
        source: WarehouseError,
    },
}

/// Everything that can stop a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("connection error: {0}")]
    Connection(#[source] WarehouseError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("load error: {0}")]
    Load(#[source] LoadError),
}

impl From<LoadError> for PipelineError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Validation(v) => Self::Validation(v),
            other => Self::Load(other),
        }
    }
}

impl PipelineError {
    /// Short failure-kind label for logs and summaries.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Extract(ExtractError::NotFound { .. }) => "not_found",
            Self::Extract(ExtractError::Format { .. }) => "format",
            Self::Validation(_) => "validation",
            Self::Load(_) => "load",
        }
    }
}

/// A failed run: the stage it was in and why it stopped.
#[derive(Debug, thiserror::Error)]
#[error("pipeline failed during {stage}: {source}")]
pub struct RunError {
    pub stage: RunState,
    #[source]
    pub source: PipelineError,
}
