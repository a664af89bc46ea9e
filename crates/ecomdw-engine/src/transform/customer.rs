use crate::error::ValidationError;
use crate::extract::Table;

use super::{dedup_by, require_column, require_shape, require_values, Transform};

const ENTITY: &str = "customers";

/// Customer rules: key required, e-mail lower-cased, `full_name` derived
/// from first and last name, duplicate keys dropped (first wins).
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerTransformer;

impl Transform for CustomerTransformer {
    fn transform(&self, mut table: Table) -> Result<Table, ValidationError> {
        require_shape(&table, ENTITY)?;
        let key = require_column(&table, ENTITY, "customer_key")?;
        let first = require_column(&table, ENTITY, "first_name")?;
        let last = require_column(&table, ENTITY, "last_name")?;
        let email = require_column(&table, ENTITY, "email")?;
        require_values(&table, ENTITY, key, "customer_key")?;

        let full = table.ensure_column("full_name");
        for row in &mut table.rows {
            for cell in row.iter_mut() {
                let trimmed = cell.trim();
                if trimmed.len() != cell.len() {
                    *cell = trimmed.to_string();
                }
            }
            row[email] = row[email].to_lowercase();
            row[full] = format!("{} {}", row[first], row[last]).trim().to_string();
        }

        dedup_by(&mut table, ENTITY, |row| row[key].clone());
        Ok(table)
    }
}
