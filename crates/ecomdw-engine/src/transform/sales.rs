use chrono::{Datelike, NaiveDate};

use crate::descriptor::{is_null_token, parse_date, parse_integer};
use crate::error::ValidationError;
use crate::extract::Table;

use super::{dedup_by, require_column, require_shape, require_values, Transform};

const ENTITY: &str = "sales";

/// Sales rules: order number required, positive quantity, `date_key`
/// (`YYYYMMDD`) and `days_to_ship` derived from the order and ship dates,
/// duplicate order lines dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesTransformer;

/// `YYYYMMDD` as an integer, e.g. 2024-01-05 -> 20240105.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

impl Transform for SalesTransformer {
    fn transform(&self, mut table: Table) -> Result<Table, ValidationError> {
        require_shape(&table, ENTITY)?;
        let order = require_column(&table, ENTITY, "order_number")?;
        let line = require_column(&table, ENTITY, "order_line_number")?;
        let quantity = require_column(&table, ENTITY, "quantity")?;
        let order_date = require_column(&table, ENTITY, "order_date")?;
        let ship_date = require_column(&table, ENTITY, "ship_date")?;
        require_values(&table, ENTITY, order, "order_number")?;

        let key_col = table.ensure_column("date_key");
        let days_col = table.ensure_column("days_to_ship");
        for (idx, row) in table.rows.iter_mut().enumerate() {
            let row_no = idx + 1;
            let err = |msg: String| ValidationError::row(ENTITY, row_no, msg);

            let qty = parse_integer(row[quantity].trim())
                .ok_or_else(|| err(format!("quantity '{}' is not an integer", row[quantity])))?;
            if qty <= 0 {
                return Err(err(format!("quantity must be > 0, got {qty}")));
            }

            let ordered = parse_date(row[order_date].trim())
                .ok_or_else(|| err(format!("order_date '{}' is not a date", row[order_date])))?;
            row[key_col] = date_key(ordered).to_string();

            row[days_col] = if is_null_token(&row[ship_date]) {
                String::new()
            } else {
                let shipped = parse_date(row[ship_date].trim())
                    .ok_or_else(|| err(format!("ship_date '{}' is not a date", row[ship_date])))?;
                let days = (shipped - ordered).num_days();
                if days < 0 {
                    return Err(err(format!(
                        "ship_date {shipped} is before order_date {ordered}"
                    )));
                }
                days.to_string()
            };
        }

        dedup_by(&mut table, ENTITY, |row| {
            (row[order].clone(), row[line].trim().to_string())
        });
        Ok(table)
    }
}
