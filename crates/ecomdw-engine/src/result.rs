//! Pipeline run result types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rows committed into one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLoad {
    pub entity: &'static str,
    pub table: &'static str,
    pub rows: u64,
    pub duration_secs: f64,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: f64,
    /// In load order.
    pub tables: Vec<TableLoad>,
}

impl RunSummary {
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    #[must_use]
    pub fn rows_for(&self, table: &str) -> Option<u64> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.rows)
    }
}
