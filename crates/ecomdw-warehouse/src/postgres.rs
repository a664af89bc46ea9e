//! `PostgreSQL`-backed implementation of [`Warehouse`].
//!
//! Uses the sync `postgres` crate. The crate drives its own internal tokio
//! runtime, so callers stay fully synchronous.

use pg_escape::quote_identifier;
use postgres::types::ToSql;
use postgres::{Client, Config as PgConfig, NoTls};

use crate::backend::{Connect, Warehouse};
use crate::config::WarehouseConfig;
use crate::error::{self, WarehouseError};
use crate::value::{ColumnType, Row, Value};

/// `PostgreSQL` wire-protocol limit on bind parameters per statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Opens [`PostgresWarehouse`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresConnector;

impl Connect for PostgresConnector {
    type Handle = PostgresWarehouse;

    fn open(&self, config: &WarehouseConfig) -> error::Result<PostgresWarehouse> {
        PostgresWarehouse::connect(config)
    }
}

/// One `PostgreSQL` session plus its implicit transaction.
pub struct PostgresWarehouse {
    client: Option<Client>,
    in_transaction: bool,
}

impl PostgresWarehouse {
    /// Connect using host / port / user / optional password / database from
    /// `config`, then point the session's search path at `config.schema`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::BackendContext`] if the connection or the
    /// search-path statement fails.
    pub fn connect(config: &WarehouseConfig) -> error::Result<Self> {
        let mut pg = PgConfig::new();
        pg.host(&config.host);
        pg.port(config.port);
        pg.user(&config.user);
        if let Some(password) = &config.password {
            pg.password(password);
        }
        pg.dbname(&config.database);

        Self::connect_with(&pg, &config.schema).map_err(|e| match e {
            WarehouseError::Backend(source) => WarehouseError::BackendContext {
                context: format!(
                    "connect to {}:{}/{}",
                    config.host, config.port, config.database
                ),
                source,
            },
            other => other,
        })
    }

    /// Connect with a prepared driver config (or parsed connection string).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the connection or the search-path
    /// statement fails.
    pub fn connect_with(pg: &PgConfig, schema: &str) -> error::Result<Self> {
        let client = pg.connect(NoTls).map_err(WarehouseError::backend)?;
        let mut handle = Self {
            client: Some(client),
            in_transaction: false,
        };
        let set_path = format!("SET search_path TO {}", quote_identifier(schema));
        handle
            .execute(&set_path, &[])
            .and_then(|_| handle.commit())
            .map_err(|e| WarehouseError::backend_context(format!("set search_path to {schema}"), e))?;
        tracing::debug!(schema, "postgres session ready");
        Ok(handle)
    }

    /// Run a multi-statement script outside the implicit transaction
    /// (DDL bootstrap, test cleanup).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if any statement fails.
    pub fn batch_execute(&mut self, script: &str) -> error::Result<()> {
        self.client()?
            .batch_execute(script)
            .map_err(WarehouseError::backend)
    }

    fn client(&mut self) -> error::Result<&mut Client> {
        self.client.as_mut().ok_or(WarehouseError::Closed)
    }

    fn begin_if_needed(&mut self) -> error::Result<()> {
        if !self.in_transaction {
            self.client()?
                .batch_execute("BEGIN")
                .map_err(|e| WarehouseError::backend_context("BEGIN", e))?;
            self.in_transaction = true;
        }
        Ok(())
    }
}

fn as_tosql(value: &Value) -> &(dyn ToSql + Sync) {
    match value {
        Value::Int32(v) => v,
        Value::Int64(v) => v,
        Value::Float64(v) => v,
        Value::Boolean(v) => v,
        Value::Text(v) => v,
        Value::Date(v) => v,
    }
}

fn decode(row: &postgres::Row, idx: usize, ty: ColumnType) -> Result<Value, postgres::Error> {
    Ok(match ty {
        ColumnType::Int32 => Value::Int32(row.try_get(idx)?),
        ColumnType::Int64 => Value::Int64(row.try_get(idx)?),
        ColumnType::Float64 => Value::Float64(row.try_get(idx)?),
        ColumnType::Boolean => Value::Boolean(row.try_get(idx)?),
        ColumnType::Text => Value::Text(row.try_get(idx)?),
        ColumnType::Date => Value::Date(row.try_get(idx)?),
    })
}

impl Warehouse for PostgresWarehouse {
    fn execute(&mut self, sql: &str, params: &[&Value]) -> error::Result<u64> {
        self.begin_if_needed()?;
        let bound: Vec<&(dyn ToSql + Sync)> = params.iter().map(|v| as_tosql(v)).collect();
        self.client()?
            .execute(sql, &bound)
            .map_err(WarehouseError::backend)
    }

    fn truncate(&mut self, table: &str) -> error::Result<()> {
        let sql = format!("TRUNCATE TABLE {} CASCADE", quote_identifier(table));
        self.execute(&sql, &[]).map(|_| ())
    }

    fn query(&mut self, sql: &str, types: &[ColumnType]) -> error::Result<Vec<Row>> {
        self.begin_if_needed()?;
        let rows = self
            .client()?
            .query(sql, &[])
            .map_err(WarehouseError::backend)?;
        rows.iter()
            .map(|row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(idx, ty)| decode(row, idx, *ty))
                    .collect::<Result<Row, _>>()
                    .map_err(|e| WarehouseError::backend_context("decode row", e))
            })
            .collect()
    }

    fn commit(&mut self) -> error::Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        let result = self
            .client()?
            .batch_execute("COMMIT")
            .map_err(|e| WarehouseError::backend_context("COMMIT", e));
        // A failed COMMIT still ends the transaction server-side.
        self.in_transaction = false;
        result
    }

    fn rollback(&mut self) -> error::Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        let result = self
            .client()?
            .batch_execute("ROLLBACK")
            .map_err(|e| WarehouseError::backend_context("ROLLBACK", e));
        self.in_transaction = false;
        result
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn max_bind_params(&self) -> usize {
        MAX_BIND_PARAMS
    }

    fn close(&mut self) -> error::Result<()> {
        self.in_transaction = false;
        match self.client.take() {
            Some(client) => client.close().map_err(WarehouseError::backend),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    /// Helper: get Postgres connection string from env or skip test.
    fn test_config() -> PgConfig {
        std::env::var("TEST_POSTGRES_URL")
            .expect("TEST_POSTGRES_URL not set")
            .parse()
            .expect("TEST_POSTGRES_URL is not a valid connection string")
    }

    /// Helper: open a session on a fresh test schema.
    fn open_clean(schema_name: &str) -> PostgresWarehouse {
        let mut wh = PostgresWarehouse::connect_with(&test_config(), "public").unwrap();
        wh.batch_execute(&format!("DROP SCHEMA IF EXISTS {schema_name} CASCADE"))
            .unwrap();
        wh.batch_execute(&schema::postgres_bootstrap(schema_name))
            .unwrap();
        wh
    }

    #[test]
    fn as_tosql_binds_typed_nulls() {
        // Only checks the mapping is total; binding is exercised below.
        for ty in [
            ColumnType::Int32,
            ColumnType::Int64,
            ColumnType::Float64,
            ColumnType::Boolean,
            ColumnType::Text,
            ColumnType::Date,
        ] {
            let null = ty.null();
            let _ = as_tosql(&null);
        }
    }

    #[test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    fn insert_commit_and_query() {
        let mut wh = open_clean("ecomdw_pg_insert");
        let visa = Value::from("Visa");
        let card = Value::from("Credit Card");
        wh.execute(
            "INSERT INTO dim_payment_method (payment_type, payment_provider) VALUES ($1, $2)",
            &[&card, &visa],
        )
        .unwrap();
        assert!(wh.in_transaction());
        wh.commit().unwrap();
        assert!(!wh.in_transaction());

        let rows = wh
            .query(
                "SELECT payment_type, payment_provider FROM dim_payment_method",
                &[ColumnType::Text, ColumnType::Text],
            )
            .unwrap();
        assert_eq!(rows, vec![vec![card, visa]]);
        wh.close().unwrap();
    }

    #[test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    fn rollback_discards_uncommitted_rows() {
        let mut wh = open_clean("ecomdw_pg_rollback");
        let row = [Value::from("Express"), Value::from("FedEx"), Value::from(2)];
        wh.execute(
            "INSERT INTO dim_shipping_method (shipping_type, carrier, estimated_days) VALUES ($1, $2, $3)",
            &row.iter().collect::<Vec<_>>(),
        )
        .unwrap();
        wh.rollback().unwrap();

        let rows = wh
            .query("SELECT COUNT(*) FROM dim_shipping_method", &[ColumnType::Int64])
            .unwrap();
        assert_eq!(rows[0][0], Value::Int64(Some(0)));
    }

    #[test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    fn close_is_idempotent_and_blocks_further_use() {
        let mut wh = open_clean("ecomdw_pg_close");
        wh.close().unwrap();
        wh.close().unwrap();
        let err = wh.execute("SELECT 1", &[]).unwrap_err();
        assert!(matches!(err, WarehouseError::Closed));
    }
}
