//! `SQLite`-backed implementation of [`Warehouse`].
//!
//! Schema DDL is applied on open and foreign keys are enforced, so deleting
//! from a dimension cascades into `fact_sales` the same way `TRUNCATE ...
//! CASCADE` does on `PostgreSQL`. There is no search path; the configured
//! schema name is ignored.

use std::path::{Path, PathBuf};

use pg_escape::quote_identifier;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params_from_iter, Connection, ToSql};

use crate::backend::{Connect, Warehouse};
use crate::config::{BackendKind, WarehouseConfig};
use crate::error::{self, WarehouseError};
use crate::schema::SQLITE_TABLES;
use crate::value::{ColumnType, Row, Value};

/// Opens [`SqliteWarehouse`] sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SqliteConnector {
    /// Use the path from [`BackendKind::Sqlite`] in the config.
    #[default]
    Configured,
    /// Always open this file, whatever the config says.
    File(PathBuf),
    /// Fresh in-memory database per open (tests).
    InMemory,
}

impl Connect for SqliteConnector {
    type Handle = SqliteWarehouse;

    fn open(&self, config: &WarehouseConfig) -> error::Result<SqliteWarehouse> {
        match self {
            Self::Configured => match &config.backend {
                BackendKind::Sqlite { path } => SqliteWarehouse::open(path),
                BackendKind::Postgres => Err(WarehouseError::Config(
                    "sqlite connector used with a postgres configuration".into(),
                )),
            },
            Self::File(path) => SqliteWarehouse::open(path),
            Self::InMemory => SqliteWarehouse::in_memory(),
        }
    }
}

/// One `SQLite` connection plus its implicit transaction.
pub struct SqliteWarehouse {
    conn: Option<Connection>,
    in_transaction: bool,
}

impl SqliteWarehouse {
    /// Open or create a warehouse database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Io`] if the directory can't be created,
    /// or [`WarehouseError::Backend`] if the database can't be opened.
    pub fn open(path: &Path) -> error::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| {
            WarehouseError::backend_context(format!("open {}", path.display()), e)
        })?;
        Self::init(conn)
    }

    /// Create an in-memory warehouse (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Backend`] if the in-memory database can't
    /// be initialized.
    pub fn in_memory() -> error::Result<Self> {
        let conn = Connection::open_in_memory().map_err(WarehouseError::backend)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> error::Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| WarehouseError::backend_context("enable foreign keys", e))?;
        conn.execute_batch(SQLITE_TABLES)
            .map_err(|e| WarehouseError::backend_context("create tables", e))?;
        tracing::debug!(path = ?conn.path(), "sqlite warehouse ready");
        Ok(Self {
            conn: Some(conn),
            in_transaction: false,
        })
    }

    fn conn(&self) -> error::Result<&Connection> {
        self.conn.as_ref().ok_or(WarehouseError::Closed)
    }

    fn begin_if_needed(&mut self) -> error::Result<()> {
        if !self.in_transaction {
            self.conn()?
                .execute_batch("BEGIN")
                .map_err(|e| WarehouseError::backend_context("BEGIN", e))?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn end_transaction(&mut self, statement: &str) -> error::Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        let result = self
            .conn()?
            .execute_batch(statement)
            .map_err(|e| WarehouseError::backend_context(statement, e));
        // A failed COMMIT leaves SQLite in the transaction; make sure the
        // caller's follow-up rollback actually reaches the database.
        self.in_transaction = self.conn.as_ref().is_some_and(|c| !c.is_autocommit());
        result
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int32(v) => v.to_sql(),
            Self::Int64(v) => v.to_sql(),
            Self::Float64(v) => v.to_sql(),
            Self::Boolean(v) => v.to_sql(),
            Self::Text(v) => v.to_sql(),
            Self::Date(v) => v.to_sql(),
        }
    }
}

fn decode(row: &rusqlite::Row<'_>, idx: usize, ty: ColumnType) -> rusqlite::Result<Value> {
    Ok(match ty {
        ColumnType::Int32 => Value::Int32(row.get(idx)?),
        ColumnType::Int64 => Value::Int64(row.get(idx)?),
        ColumnType::Float64 => Value::Float64(row.get(idx)?),
        ColumnType::Boolean => Value::Boolean(row.get(idx)?),
        ColumnType::Text => Value::Text(row.get(idx)?),
        ColumnType::Date => Value::Date(row.get(idx)?),
    })
}

impl Warehouse for SqliteWarehouse {
    fn execute(&mut self, sql: &str, params: &[&Value]) -> error::Result<u64> {
        self.begin_if_needed()?;
        let affected = self
            .conn()?
            .execute(sql, params_from_iter(params.iter()))
            .map_err(WarehouseError::backend)?;
        Ok(affected as u64)
    }

    fn truncate(&mut self, table: &str) -> error::Result<()> {
        let sql = format!("DELETE FROM {}", quote_identifier(table));
        self.execute(&sql, &[]).map(|_| ())
    }

    fn query(&mut self, sql: &str, types: &[ColumnType]) -> error::Result<Vec<Row>> {
        self.begin_if_needed()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(WarehouseError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, ty)| decode(row, idx, *ty))
                    .collect::<rusqlite::Result<Row>>()
            })
            .map_err(WarehouseError::backend)?
            .collect::<rusqlite::Result<Vec<Row>>>()
            .map_err(|e| WarehouseError::backend_context("decode row", e))?;
        Ok(rows)
    }

    fn commit(&mut self) -> error::Result<()> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&mut self) -> error::Result<()> {
        self.end_transaction("ROLLBACK")
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn close(&mut self) -> error::Result<()> {
        self.in_transaction = false;
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| WarehouseError::backend(e)),
            None => Ok(()),
        }
    }
}
