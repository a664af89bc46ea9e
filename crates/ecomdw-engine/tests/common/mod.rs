//! Shared helpers for the engine integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ecomdw_engine::descriptor::map_rows;
use ecomdw_engine::transform;
use ecomdw_engine::{CsvExtractor, Entity, Extractor, TableDescriptor};
use ecomdw_warehouse::{BackendKind, ColumnType, Row, Value, Warehouse, WarehouseConfig};

/// Directory holding the sample `<source>.csv` files.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

pub fn sqlite_config(path: &Path) -> WarehouseConfig {
    WarehouseConfig {
        backend: BackendKind::Sqlite {
            path: path.to_path_buf(),
        },
        ..WarehouseConfig::default()
    }
}

/// Fixture rows for `entity` after its standard transform, ready to load.
pub fn fixture_rows(entity: Entity) -> Vec<Row> {
    let mut table = CsvExtractor::new(fixture_dir())
        .extract(entity.source_name())
        .unwrap();
    if let Some(rules) = transform::for_entity(entity) {
        table = rules.transform(table).unwrap();
    }
    map_rows(entity.descriptor(), &table).unwrap()
}

/// Every row of `descriptor`'s table in a stable order.
pub fn stored_rows(conn: &mut dyn Warehouse, descriptor: &TableDescriptor) -> Vec<Row> {
    sorted(
        conn.query(&descriptor.select_all_sql(), &descriptor.column_types())
            .unwrap(),
    )
}

/// Order rows independently of how the warehouse returned them.
pub fn sorted(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort_by_key(|row| format!("{row:?}"));
    rows
}

pub fn count(conn: &mut dyn Warehouse, table: &str) -> i64 {
    let rows = conn
        .query(
            &format!("SELECT COUNT(*) FROM {table}"),
            &[ColumnType::Int64],
        )
        .unwrap();
    match rows[0][0] {
        Value::Int64(Some(n)) => n,
        ref other => panic!("unexpected count value: {other:?}"),
    }
}
