use std::path::{Path, PathBuf};

use ecomdw_engine::Entity;
use serde::Serialize;

use crate::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum DatagenError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {} failed: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Write `data` into `dir` as `<source_name>.csv`, one file per entity.
///
/// Returns the written paths in load order.
///
/// # Errors
///
/// Returns [`DatagenError`] if `dir` cannot be created or a file cannot be written.
pub fn write_csv(dir: &Path, data: &Dataset) -> Result<Vec<PathBuf>, DatagenError> {
    std::fs::create_dir_all(dir).map_err(|source| DatagenError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(vec![
        write_entity(dir, Entity::PaymentMethods, &data.payment_methods)?,
        write_entity(dir, Entity::ShippingMethods, &data.shipping_methods)?,
        write_entity(dir, Entity::Customers, &data.customers)?,
        write_entity(dir, Entity::Products, &data.products)?,
        write_entity(dir, Entity::Locations, &data.locations)?,
        write_entity(dir, Entity::Sales, &data.sales)?,
    ])
}

fn write_entity<T: Serialize>(dir: &Path, entity: Entity, records: &[T]) -> Result<PathBuf, DatagenError> {
    let path = dir.join(format!("{}.csv", entity.source_name()));
    let fail = |source| DatagenError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(&path).map_err(fail)?;
    for record in records {
        writer.serialize(record).map_err(fail)?;
    }
    writer.flush().map_err(|e| fail(e.into()))?;
    tracing::info!(entity = entity.as_str(), rows = records.len(), path = %path.display(), "wrote sample data");
    Ok(path)
}
