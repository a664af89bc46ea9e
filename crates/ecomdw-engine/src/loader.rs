//! Table loaders.
//!
//! Every target table is loaded through the same [`TableLoader`]
//! capability; [`DescriptorLoader`] implements it once for all six tables,
//! driven by each table's [`TableDescriptor`].

use std::num::NonZeroUsize;

use ecomdw_warehouse::{Row, Warehouse};

use crate::batch::{execute_batch_insert, DEFAULT_BATCH_SIZE};
use crate::descriptor::{
    Entity, TableDescriptor, CUSTOMERS, LOCATIONS, PAYMENT_METHODS, PRODUCTS, SALES,
    SHIPPING_METHODS,
};
use crate::error::{LoadError, ValidationError};

/// Loads one target table through a borrowed warehouse handle.
pub trait TableLoader {
    fn descriptor(&self) -> &'static TableDescriptor;

    /// Check `rows` without touching the warehouse.
    ///
    /// # Errors
    ///
    /// A [`ValidationError`] for empty input or rows that do not match the
    /// descriptor.
    fn validate(&self, rows: &[Row]) -> Result<(), ValidationError> {
        let d = self.descriptor();
        if rows.is_empty() {
            return Err(ValidationError::table(
                d.entity.as_str(),
                format!("no rows to load into {}", d.table),
            ));
        }
        d.validate_rows(rows)
    }

    /// Clear the target table (and rows referencing it) and commit.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Truncate`] after rolling back if the statement
    /// or its commit fails.
    fn truncate(&self, conn: &mut dyn Warehouse) -> Result<(), LoadError>;

    /// Insert `rows` and commit; returns the number of rows committed.
    ///
    /// # Errors
    ///
    /// [`LoadError::Validation`] for empty input or rows that do not match
    /// the descriptor (nothing is sent), [`LoadError::Insert`] or
    /// [`LoadError::Commit`] if the write fails.
    fn load(&self, conn: &mut dyn Warehouse, rows: &[Row]) -> Result<u64, LoadError>;
}

/// A [`TableLoader`] for any descriptor.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorLoader {
    descriptor: &'static TableDescriptor,
    batch_size: NonZeroUsize,
}

impl DescriptorLoader {
    #[must_use]
    pub fn new(descriptor: &'static TableDescriptor, batch_size: NonZeroUsize) -> Self {
        Self {
            descriptor,
            batch_size,
        }
    }

    #[must_use]
    pub fn for_entity(entity: Entity, batch_size: NonZeroUsize) -> Self {
        Self::new(entity.descriptor(), batch_size)
    }

    #[must_use]
    pub fn payment_methods() -> Self {
        Self::new(&PAYMENT_METHODS, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn shipping_methods() -> Self {
        Self::new(&SHIPPING_METHODS, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn customers() -> Self {
        Self::new(&CUSTOMERS, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn products() -> Self {
        Self::new(&PRODUCTS, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn locations() -> Self {
        Self::new(&LOCATIONS, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn sales() -> Self {
        Self::new(&SALES, DEFAULT_BATCH_SIZE)
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }
}

impl TableLoader for DescriptorLoader {
    fn descriptor(&self) -> &'static TableDescriptor {
        self.descriptor
    }

    fn truncate(&self, conn: &mut dyn Warehouse) -> Result<(), LoadError> {
        let table = self.descriptor.table;
        tracing::warn!(table, "Truncating table");
        match conn.truncate(table).and_then(|()| conn.commit()) {
            Ok(()) => {
                tracing::info!(table, "Table truncated");
                Ok(())
            }
            Err(source) => {
                tracing::error!(table, error = %source, "Error truncating table");
                if let Err(e) = conn.rollback() {
                    tracing::error!(table, error = %e, "Rollback after failed truncate also failed");
                }
                Err(LoadError::Truncate { table, source })
            }
        }
    }

    fn load(&self, conn: &mut dyn Warehouse, rows: &[Row]) -> Result<u64, LoadError> {
        let d = self.descriptor;
        self.validate(rows)?;

        let written = execute_batch_insert(conn, &d.insert_statement(), rows, self.batch_size)
            .inspect_err(|e| tracing::error!(table = d.table, error = %e, "Error executing batch insert"))?;
        tracing::info!(table = d.table, rows = written, "Loaded rows");
        Ok(written)
    }
}

/// The loaders a pipeline run drives, one per [`Entity`].
pub struct LoaderSet {
    loaders: [Box<dyn TableLoader>; 6],
}

impl LoaderSet {
    /// Descriptor loaders for all six tables.
    #[must_use]
    pub fn standard(batch_size: NonZeroUsize) -> Self {
        Self {
            loaders: Entity::ALL.map(|entity| {
                Box::new(DescriptorLoader::for_entity(entity, batch_size)) as Box<dyn TableLoader>
            }),
        }
    }

    /// Swap in a custom loader for the entity its descriptor names.
    #[must_use]
    pub fn replace(mut self, loader: Box<dyn TableLoader>) -> Self {
        let idx = loader.descriptor().entity.index();
        self.loaders[idx] = loader;
        self
    }

    #[must_use]
    pub fn get(&self, entity: Entity) -> &dyn TableLoader {
        self.loaders[entity.index()].as_ref()
    }
}

impl Default for LoaderSet {
    fn default() -> Self {
        Self::standard(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use ecomdw_warehouse::{ColumnType, SqliteWarehouse, Value, WarehouseError};

    use super::*;

    fn payment_rows() -> Vec<Row> {
        vec![
            vec![Value::from("Credit Card"), Value::from("Visa")],
            vec![Value::from("Digital Wallet"), Value::from("PayPal")],
        ]
    }

    #[test]
    fn constructors_cover_every_entity() {
        let loaders = [
            DescriptorLoader::payment_methods(),
            DescriptorLoader::shipping_methods(),
            DescriptorLoader::customers(),
            DescriptorLoader::products(),
            DescriptorLoader::locations(),
            DescriptorLoader::sales(),
        ];
        for (loader, entity) in loaders.iter().zip(Entity::ALL) {
            assert_eq!(loader.descriptor().entity, entity);
            assert_eq!(loader.batch_size(), DEFAULT_BATCH_SIZE);
        }
    }

    #[test]
    fn empty_input_is_rejected_before_touching_the_warehouse() {
        let mut wh = SqliteWarehouse::in_memory().unwrap();
        let err = DescriptorLoader::payment_methods()
            .load(&mut wh, &[])
            .unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)));
        assert!(!wh.in_transaction());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut wh = SqliteWarehouse::in_memory().unwrap();
        let rows = vec![vec![Value::from("Credit Card")]];
        let err = DescriptorLoader::payment_methods()
            .load(&mut wh, &rows)
            .unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)));
        assert!(!wh.in_transaction());
    }

    #[test]
    fn load_commits_and_returns_count() {
        let mut wh = SqliteWarehouse::in_memory().unwrap();
        let written = DescriptorLoader::payment_methods()
            .load(&mut wh, &payment_rows())
            .unwrap();
        assert_eq!(written, 2);
        assert!(!wh.in_transaction());
        let stored = wh
            .query(
                &PAYMENT_METHODS.select_all_sql(),
                &[ColumnType::Text, ColumnType::Text],
            )
            .unwrap();
        assert_eq!(stored, payment_rows());
    }

    #[test]
    fn truncate_clears_and_commits() {
        let mut wh = SqliteWarehouse::in_memory().unwrap();
        let loader = DescriptorLoader::payment_methods();
        loader.load(&mut wh, &payment_rows()).unwrap();
        loader.truncate(&mut wh).unwrap();
        assert!(!wh.in_transaction());
        let stored = wh
            .query(&PAYMENT_METHODS.select_all_sql(), &PAYMENT_METHODS.column_types())
            .unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn truncate_failure_is_reported_with_table() {
        let mut wh = SqliteWarehouse::in_memory().unwrap();
        wh.close().unwrap();
        let err = DescriptorLoader::customers().truncate(&mut wh).unwrap_err();
        match err {
            LoadError::Truncate { table, source } => {
                assert_eq!(table, "dim_customer");
                assert!(matches!(source, WarehouseError::Closed));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loader_set_replace_targets_descriptor_entity() {
        let set = LoaderSet::standard(NonZeroUsize::new(7).unwrap())
            .replace(Box::new(DescriptorLoader::sales()));
        assert_eq!(set.get(Entity::Sales).descriptor().table, "fact_sales");
        assert_eq!(set.get(Entity::Customers).descriptor().table, "dim_customer");
    }
}
