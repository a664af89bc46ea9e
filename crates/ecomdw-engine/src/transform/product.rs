use crate::descriptor::parse_bool;
use crate::error::ValidationError;
use crate::extract::Table;

use super::{dedup_by, require_column, require_shape, require_values, Transform};

const ENTITY: &str = "products";

/// Product rules: key required, prices non-negative, `profit_margin`
/// derived as a percentage of unit price, `is_active` normalised, duplicate
/// keys dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductTransformer;

/// `(unit_price - cost_price) / unit_price * 100`, two decimals; zero for
/// free products.
#[must_use]
pub fn profit_margin(unit_price: f64, cost_price: f64) -> f64 {
    if unit_price == 0.0 {
        return 0.0;
    }
    ((unit_price - cost_price) / unit_price * 100.0 * 100.0).round() / 100.0
}

fn parse_price(cell: &str, row: usize, name: &str) -> Result<f64, ValidationError> {
    let value = cell
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::row(ENTITY, row, format!("{name} '{cell}' is not a number")))?;
    if value < 0.0 {
        return Err(ValidationError::row(
            ENTITY,
            row,
            format!("{name} must be >= 0, got {value}"),
        ));
    }
    Ok(value)
}

impl Transform for ProductTransformer {
    fn transform(&self, mut table: Table) -> Result<Table, ValidationError> {
        require_shape(&table, ENTITY)?;
        let key = require_column(&table, ENTITY, "product_key")?;
        let unit = require_column(&table, ENTITY, "unit_price")?;
        let cost = require_column(&table, ENTITY, "cost_price")?;
        let active = require_column(&table, ENTITY, "is_active")?;
        require_values(&table, ENTITY, key, "product_key")?;

        let margin = table.ensure_column("profit_margin");
        for (idx, row) in table.rows.iter_mut().enumerate() {
            let row_no = idx + 1;
            let unit_price = parse_price(&row[unit], row_no, "unit_price")?;
            let cost_price = parse_price(&row[cost], row_no, "cost_price")?;
            row[margin] = profit_margin(unit_price, cost_price).to_string();

            let is_active = parse_bool(row[active].trim()).ok_or_else(|| {
                ValidationError::row(
                    ENTITY,
                    row_no,
                    format!("is_active '{}' is not a boolean", row[active]),
                )
            })?;
            row[active] = is_active.to_string();
        }

        dedup_by(&mut table, ENTITY, |row| row[key].clone());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::table;

    const HEADERS: [&str; 5] = ["product_key", "product_name", "unit_price", "cost_price", "is_active"];

    #[test]
    fn margin_is_rounded_percentage() {
        assert!((profit_margin(29.99, 18.5) - 38.31).abs() < 1e-9);
        assert!((profit_margin(10.0, 10.0)).abs() < f64::EPSILON);
        assert!((profit_margin(0.0, 5.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn derives_margin_and_normalises_flag() {
        let t = table(
            &HEADERS,
            &[
                &["PROD-000001", "Widget", "20", "15", "True"],
                &["PROD-000002", "Gadget", "0", "0", "0"],
            ],
        );
        let out = ProductTransformer.transform(t).unwrap();
        let margin = out.column_index("profit_margin").unwrap();
        assert_eq!(out.rows[0][margin], "25");
        assert_eq!(out.rows[0][4], "true");
        assert_eq!(out.rows[1][margin], "0");
        assert_eq!(out.rows[1][4], "false");
    }

    #[test]
    fn negative_price_is_rejected() {
        let t = table(&HEADERS, &[&["PROD-000001", "Widget", "-1", "0", "true"]]);
        let err = ProductTransformer.transform(t).unwrap_err();
        assert_eq!(err.row, Some(1));
        assert!(err.message.contains("unit_price"), "got: {err}");
    }

    #[test]
    fn unparsable_flag_is_rejected() {
        let t = table(&HEADERS, &[&["PROD-000001", "Widget", "1", "0", "sometimes"]]);
        assert!(ProductTransformer.transform(t).is_err());
    }

    #[test]
    fn duplicate_keys_are_dropped() {
        let t = table(
            &HEADERS,
            &[
                &["PROD-000001", "Widget", "1", "0", "true"],
                &["PROD-000001", "Widget v2", "2", "1", "true"],
            ],
        );
        assert_eq!(ProductTransformer.transform(t).unwrap().len(), 1);
    }
}
