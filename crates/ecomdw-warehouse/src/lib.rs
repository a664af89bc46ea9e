//! Warehouse connection handles for the e-commerce loader.
//!
//! Provides the [`Warehouse`] trait (one live session plus its implicit
//! transaction), the [`Connect`] trait that opens one, and `PostgreSQL` /
//! `SQLite` implementations of both. Row values travel as typed, nullable
//! [`Value`]s so every backend can bind them without guessing.

#![warn(clippy::pedantic)]

pub mod backend;
pub mod config;
pub mod error;
pub mod postgres;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use crate::backend::{Connect, Warehouse};
pub use crate::config::{BackendKind, WarehouseConfig};
pub use crate::error::WarehouseError;
pub use crate::postgres::{PostgresConnector, PostgresWarehouse};
pub use crate::sqlite::{SqliteConnector, SqliteWarehouse};
pub use crate::value::{ColumnType, Row, Value};
