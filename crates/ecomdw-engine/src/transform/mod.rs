//! Per-entity cleaning and derivation rules applied between extraction and
//! loading.
//!
//! Transforms are pure: a [`Table`] in, a [`Table`] out. Only customers,
//! products and sales have rules; other entities pass through unchanged.

mod customer;
mod product;
mod sales;

use std::collections::HashSet;

pub use customer::CustomerTransformer;
pub use product::ProductTransformer;
pub use sales::SalesTransformer;

use crate::descriptor::Entity;
use crate::error::ValidationError;
use crate::extract::Table;

/// A cleaning / derivation step for one entity.
pub trait Transform {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the entity, the 1-based row and
    /// the rule that was broken.
    fn transform(&self, table: Table) -> Result<Table, ValidationError>;
}

/// Returns the table untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transform for Passthrough {
    fn transform(&self, table: Table) -> Result<Table, ValidationError> {
        Ok(table)
    }
}

/// The standard transform for `entity`, if it has one.
#[must_use]
pub fn for_entity(entity: Entity) -> Option<&'static dyn Transform> {
    match entity {
        Entity::Customers => Some(&CustomerTransformer),
        Entity::Products => Some(&ProductTransformer),
        Entity::Sales => Some(&SalesTransformer),
        Entity::PaymentMethods | Entity::ShippingMethods | Entity::Locations => None,
    }
}

/// Fail on the first row whose cell count differs from the header count.
///
/// Rules index cells by header position, so every row must be full width.
fn require_shape(table: &Table, entity: &'static str) -> Result<(), ValidationError> {
    let width = table.headers.len();
    match table.rows.iter().position(|row| row.len() != width) {
        Some(pos) => Err(ValidationError::row(
            entity,
            pos + 1,
            format!(
                "has {} cells, expected {width}",
                table.rows[pos].len()
            ),
        )),
        None => Ok(()),
    }
}

/// Index of a column the rules depend on.
fn require_column(table: &Table, entity: &'static str, name: &str) -> Result<usize, ValidationError> {
    table
        .column_index(name)
        .ok_or_else(|| ValidationError::table(entity, format!("missing column '{name}'")))
}

/// Fail if any row has an empty cell at `idx`.
fn require_values(
    table: &Table,
    entity: &'static str,
    idx: usize,
    name: &str,
) -> Result<(), ValidationError> {
    match table.rows.iter().position(|row| row[idx].trim().is_empty()) {
        Some(pos) => Err(ValidationError::row(entity, pos + 1, format!("{name} is required"))),
        None => Ok(()),
    }
}

/// Keep the first row for each key; later duplicates are dropped and logged.
fn dedup_by<K, F>(table: &mut Table, entity: &'static str, key: F)
where
    K: std::hash::Hash + Eq,
    F: Fn(&[String]) -> K,
{
    let before = table.rows.len();
    let mut seen = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(key(row)));
    let dropped = before - table.rows.len();
    if dropped > 0 {
        tracing::warn!(entity, dropped, "Dropped duplicate rows");
    }
}

#[cfg(test)]
pub(crate) fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
        headers.iter().map(ToString::to_string).collect(),
        rows.iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect(),
    )
}
