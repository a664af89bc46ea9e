//! Batch insert executor.
//!
//! Rows are written as multi-value `INSERT ... VALUES (...), (...)`
//! statements, one statement per chunk, all inside the handle's current
//! transaction. The whole call commits once at the end, so a failure in any
//! chunk (or in the commit) leaves the table as it was before the call.

use std::fmt::Write as _;
use std::num::NonZeroUsize;

use ecomdw_warehouse::{Row, Value, Warehouse};
use pg_escape::quote_identifier;

use crate::error::LoadError;

/// Rows per INSERT statement unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

/// A parameterized insert into one table: target name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: &'static str,
    pub columns: Vec<&'static str>,
}

impl InsertStatement {
    pub fn new(table: &'static str, columns: Vec<&'static str>) -> Self {
        Self { table, columns }
    }

    /// SQL for a statement inserting `rows` tuples, with `$n` placeholders
    /// numbered left to right.
    #[must_use]
    pub fn render(&self, rows: usize) -> String {
        let col_list = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let header = format!(
            "INSERT INTO {} ({}) VALUES ",
            quote_identifier(self.table),
            col_list
        );
        let width = self.columns.len();
        let mut sql = String::with_capacity(header.len() + rows * width * 6);
        sql.push_str(&header);

        let mut param = 0usize;
        for row_idx in 0..rows {
            if row_idx > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for pos in 0..width {
                if pos > 0 {
                    sql.push_str(", ");
                }
                param += 1;
                let _ = write!(sql, "${param}");
            }
            sql.push(')');
        }
        sql
    }
}

/// Rows per statement: `batch_size`, reduced if needed so one statement
/// stays within the backend's bind-parameter limit.
#[must_use]
pub fn effective_chunk_size(batch_size: NonZeroUsize, columns: usize, max_params: usize) -> usize {
    let by_params = if columns == 0 {
        batch_size.get()
    } else {
        (max_params / columns).max(1)
    };
    batch_size.get().min(by_params)
}

/// Insert `rows` through `conn` in chunks and commit once.
///
/// Returns the number of rows in `rows`. An empty slice still issues a
/// commit and returns 0.
///
/// # Errors
///
/// On a chunk failure the transaction is rolled back and
/// [`LoadError::Insert`] is returned with the failing chunk's row range
/// (1-based, inclusive) and the driver error. A failed commit is rolled
/// back and reported as [`LoadError::Commit`]. A rollback failure is only
/// logged.
pub fn execute_batch_insert(
    conn: &mut dyn Warehouse,
    statement: &InsertStatement,
    rows: &[Row],
    batch_size: NonZeroUsize,
) -> Result<u64, LoadError> {
    let chunk_size =
        effective_chunk_size(batch_size, statement.columns.len(), conn.max_bind_params());
    let total = rows.len();

    for (chunk_idx, chunk) in rows.chunks(chunk_size).enumerate() {
        let chunk_start = chunk_idx * chunk_size;
        let sql = statement.render(chunk.len());
        let params: Vec<&Value> = chunk.iter().flatten().collect();

        if let Err(source) = conn.execute(&sql, &params) {
            rollback_after_failure(conn, statement.table);
            return Err(LoadError::Insert {
                table: statement.table,
                first_row: chunk_start + 1,
                last_row: chunk_start + chunk.len(),
                source,
            });
        }
        tracing::trace!(
            table = statement.table,
            rows = chunk.len(),
            offset = chunk_start,
            "Inserted chunk"
        );
    }

    if let Err(source) = conn.commit() {
        rollback_after_failure(conn, statement.table);
        return Err(LoadError::Commit {
            table: statement.table,
            rows: total,
            source,
        });
    }

    tracing::debug!(table = statement.table, rows = total, "Batch insert committed");
    Ok(total as u64)
}

fn rollback_after_failure(conn: &mut dyn Warehouse, table: &str) {
    if let Err(e) = conn.rollback() {
        tracing::error!(table, error = %e, "Rollback after failed insert also failed");
    }
}

#[cfg(test)]
mod tests {
    use ecomdw_warehouse::{ColumnType, WarehouseError};

    use super::*;

    /// Records statements; fails the `fail_on`-th execute (1-based) or the
    /// commit when asked.
    #[derive(Default)]
    struct ScriptedWarehouse {
        executed: Vec<(String, usize)>,
        fail_on: Option<usize>,
        fail_commit: bool,
        max_params: Option<usize>,
        open: bool,
        commits: usize,
        rollbacks: usize,
    }

    impl Warehouse for ScriptedWarehouse {
        fn execute(&mut self, sql: &str, params: &[&Value]) -> ecomdw_warehouse::error::Result<u64> {
            self.open = true;
            self.executed.push((sql.to_string(), params.len()));
            if self.fail_on == Some(self.executed.len()) {
                return Err(WarehouseError::backend("duplicate key value"));
            }
            Ok(0)
        }

        fn truncate(&mut self, _table: &str) -> ecomdw_warehouse::error::Result<()> {
            Ok(())
        }

        fn query(
            &mut self,
            _sql: &str,
            _types: &[ColumnType],
        ) -> ecomdw_warehouse::error::Result<Vec<Row>> {
            Ok(Vec::new())
        }

        fn commit(&mut self) -> ecomdw_warehouse::error::Result<()> {
            self.commits += 1;
            self.open = false;
            if self.fail_commit {
                return Err(WarehouseError::backend("could not serialize access"));
            }
            Ok(())
        }

        fn rollback(&mut self) -> ecomdw_warehouse::error::Result<()> {
            self.rollbacks += 1;
            self.open = false;
            Ok(())
        }

        fn in_transaction(&self) -> bool {
            self.open
        }

        fn max_bind_params(&self) -> usize {
            self.max_params.unwrap_or(65_535)
        }

        fn close(&mut self) -> ecomdw_warehouse::error::Result<()> {
            Ok(())
        }
    }

    fn statement() -> InsertStatement {
        InsertStatement::new("dim_payment_method", vec!["payment_type", "payment_provider"])
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| vec![Value::from("Credit Card"), Value::from(format!("Provider {i}"))])
            .collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn render_numbers_placeholders_across_rows() {
        assert_eq!(
            statement().render(2),
            "INSERT INTO dim_payment_method (payment_type, payment_provider) VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn render_quotes_identifiers_that_need_it() {
        let stmt = InsertStatement::new("Order Lines", vec!["size"]);
        assert!(stmt.render(1).starts_with("INSERT INTO \"Order Lines\""));
    }

    #[test]
    fn chunk_size_respects_bind_limit() {
        assert_eq!(effective_chunk_size(size(1000), 23, 65_535), 1000);
        assert_eq!(effective_chunk_size(size(5000), 23, 65_535), 2849);
        assert_eq!(effective_chunk_size(size(10), 4, 3), 1);
    }

    #[test]
    fn splits_into_expected_statement_count() {
        let mut wh = ScriptedWarehouse::default();
        let written = execute_batch_insert(&mut wh, &statement(), &rows(25), size(10)).unwrap();
        assert_eq!(written, 25);
        let sizes: Vec<usize> = wh.executed.iter().map(|(_, n)| *n).collect();
        assert_eq!(sizes, vec![20, 20, 10]);
        assert_eq!(wh.commits, 1);
        assert_eq!(wh.rollbacks, 0);
    }

    #[test]
    fn empty_input_commits_and_returns_zero() {
        let mut wh = ScriptedWarehouse::default();
        let written = execute_batch_insert(&mut wh, &statement(), &[], DEFAULT_BATCH_SIZE).unwrap();
        assert_eq!(written, 0);
        assert!(wh.executed.is_empty());
        assert_eq!(wh.commits, 1);
    }

    #[test]
    fn failing_chunk_rolls_back_and_reports_range() {
        let mut wh = ScriptedWarehouse {
            fail_on: Some(3),
            ..ScriptedWarehouse::default()
        };
        let err = execute_batch_insert(&mut wh, &statement(), &rows(25), size(10)).unwrap_err();
        match err {
            LoadError::Insert {
                table,
                first_row,
                last_row,
                ..
            } => {
                assert_eq!(table, "dim_payment_method");
                assert_eq!((first_row, last_row), (21, 25));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(wh.commits, 0);
        assert_eq!(wh.rollbacks, 1);
    }

    #[test]
    fn commit_failure_rolls_back() {
        let mut wh = ScriptedWarehouse {
            fail_commit: true,
            ..ScriptedWarehouse::default()
        };
        let err = execute_batch_insert(&mut wh, &statement(), &rows(3), size(10)).unwrap_err();
        assert!(matches!(err, LoadError::Commit { rows: 3, .. }), "got: {err}");
        assert!(err.to_string().contains("could not serialize access"), "got: {err}");
        assert_eq!(wh.rollbacks, 1);
    }

    #[test]
    fn empty_commit_failure_does_not_report_a_row_range() {
        let mut wh = ScriptedWarehouse {
            fail_commit: true,
            ..ScriptedWarehouse::default()
        };
        let err = execute_batch_insert(&mut wh, &statement(), &[], size(10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "commit of 0 rows into dim_payment_method failed: could not serialize access"
        );
        assert_eq!(wh.rollbacks, 1);
    }

    #[test]
    fn small_bind_limit_shrinks_chunks() {
        let mut wh = ScriptedWarehouse {
            max_params: Some(5),
            ..ScriptedWarehouse::default()
        };
        execute_batch_insert(&mut wh, &statement(), &rows(5), size(1000)).unwrap();
        assert_eq!(wh.executed.len(), 3);
    }
}
