//! Warehouse handle trait definitions.
//!
//! [`Warehouse`] is one live database session. Statements run inside an
//! implicit transaction: the first statement after a commit or rollback
//! opens it, and [`Warehouse::commit`] / [`Warehouse::rollback`] close it.
//! Both are no-ops when nothing is open.

use crate::config::WarehouseConfig;
use crate::error;
use crate::value::{ColumnType, Row, Value};

/// Bind-parameter ceiling used when a backend does not declare its own.
/// Matches `SQLite`'s default `SQLITE_MAX_VARIABLE_NUMBER`.
pub const DEFAULT_MAX_BIND_PARAMS: usize = 32_766;

/// A live warehouse session.
pub trait Warehouse {
    /// Execute one statement with positional (`$1`, `$2`, ...) parameters,
    /// opening a transaction first if none is active.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) if the statement
    /// fails or the handle is closed. The transaction stays open and must be
    /// rolled back by the caller.
    fn execute(&mut self, sql: &str, params: &[&Value]) -> error::Result<u64>;

    /// Remove every row of `table` (and rows referencing it) inside the
    /// current transaction.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) on driver failure.
    fn truncate(&mut self, table: &str) -> error::Result<()>;

    /// Run a query and decode each returned column with the given types.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) on driver failure
    /// or when a cell cannot be decoded as the requested type.
    fn query(&mut self, sql: &str, types: &[ColumnType]) -> error::Result<Vec<Row>>;

    /// Commit the open transaction, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) if the commit fails.
    fn commit(&mut self) -> error::Result<()>;

    /// Roll back the open transaction, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) if the rollback fails.
    fn rollback(&mut self) -> error::Result<()>;

    /// Whether a transaction is currently open.
    fn in_transaction(&self) -> bool;

    /// Largest number of bind parameters one statement may carry.
    fn max_bind_params(&self) -> usize {
        DEFAULT_MAX_BIND_PARAMS
    }

    /// Release the session. Later calls fail with
    /// [`WarehouseError::Closed`](crate::WarehouseError::Closed); closing
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) if the driver
    /// reports an error while shutting the session down.
    fn close(&mut self) -> error::Result<()>;
}

/// Opens warehouse sessions from connection settings.
pub trait Connect {
    type Handle: Warehouse + 'static;

    /// Open a session and establish its schema context.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`](crate::WarehouseError) when the network,
    /// authentication or schema setup fails.
    fn open(&self, config: &WarehouseConfig) -> error::Result<Self::Handle>;
}
