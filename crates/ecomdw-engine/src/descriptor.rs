//! Static per-table load metadata and the mapping from extracted tables
//! onto it.
//!
//! A [`TableDescriptor`] fixes the target table, its ordered columns (with
//! type and nullability) and whether the table is cleared before loading.
//! [`map_rows`] turns string cells into typed [`Value`]s in that order.

use std::fmt;

use chrono::NaiveDate;
use ecomdw_warehouse::{ColumnType, Row, Value};

use crate::batch::InsertStatement;
use crate::error::ValidationError;
use crate::extract::Table;

/// The six loadable entities, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    PaymentMethods,
    ShippingMethods,
    Customers,
    Products,
    Locations,
    Sales,
}

impl Entity {
    /// Every entity in the order a run loads them.
    pub const ALL: [Entity; 6] = [
        Self::PaymentMethods,
        Self::ShippingMethods,
        Self::Customers,
        Self::Products,
        Self::Locations,
        Self::Sales,
    ];

    /// Position in [`Entity::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PaymentMethods => "payment_methods",
            Self::ShippingMethods => "shipping_methods",
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Locations => "locations",
            Self::Sales => "sales",
        }
    }

    /// Logical source name handed to the extractor.
    #[must_use]
    pub fn source_name(self) -> &'static str {
        self.as_str()
    }

    #[must_use]
    pub fn descriptor(self) -> &'static TableDescriptor {
        match self {
            Self::PaymentMethods => &PAYMENT_METHODS,
            Self::ShippingMethods => &SHIPPING_METHODS,
            Self::Customers => &CUSTOMERS,
            Self::Products => &PRODUCTS,
            Self::Locations => &LOCATIONS,
            Self::Sales => &SALES,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
        nullable: false,
    }
}

const fn text_opt(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
        nullable: true,
    }
}

const fn typed(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
    }
}

const fn typed_opt(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
    }
}

/// Load metadata for one target table.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDescriptor {
    pub entity: Entity,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub truncate_before_load: bool,
}

impl TableDescriptor {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    #[must_use]
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.ty).collect()
    }

    #[must_use]
    pub fn insert_statement(&self) -> InsertStatement {
        InsertStatement::new(self.table, self.column_names().collect())
    }

    /// `SELECT` of every descriptor column, ordered by the first two.
    #[must_use]
    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY 1, 2",
            self.column_names().collect::<Vec<_>>().join(", "),
            self.table
        )
    }

    /// Check arity, value types and nullability of every row.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending row.
    pub fn validate_rows(&self, rows: &[Row]) -> Result<(), ValidationError> {
        let entity = self.entity.as_str();
        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 1;
            if row.len() != self.columns.len() {
                return Err(ValidationError::row(
                    entity,
                    row_no,
                    format!(
                        "expected {} values for {}, got {}",
                        self.columns.len(),
                        self.table,
                        row.len()
                    ),
                ));
            }
            for (col, value) in self.columns.iter().zip(row) {
                if value.column_type() != col.ty {
                    return Err(ValidationError::row(
                        entity,
                        row_no,
                        format!(
                            "column {} expects {}, got {}",
                            col.name,
                            col.ty,
                            value.column_type()
                        ),
                    ));
                }
                if value.is_null() && !col.nullable {
                    return Err(ValidationError::row(
                        entity,
                        row_no,
                        format!("column {} may not be null", col.name),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ── Descriptors ──────────────────────────────────────────────────────

pub static PAYMENT_METHODS: TableDescriptor = TableDescriptor {
    entity: Entity::PaymentMethods,
    table: "dim_payment_method",
    columns: &[text("payment_type"), text("payment_provider")],
    truncate_before_load: true,
};

pub static SHIPPING_METHODS: TableDescriptor = TableDescriptor {
    entity: Entity::ShippingMethods,
    table: "dim_shipping_method",
    columns: &[
        text("shipping_type"),
        text("carrier"),
        typed("estimated_days", ColumnType::Int32),
    ],
    truncate_before_load: true,
};

pub static CUSTOMERS: TableDescriptor = TableDescriptor {
    entity: Entity::Customers,
    table: "dim_customer",
    columns: &[
        text("customer_key"),
        text("first_name"),
        text("last_name"),
        text("full_name"),
        text("email"),
        text_opt("phone"),
        typed_opt("date_of_birth", ColumnType::Date),
        text_opt("gender"),
        text_opt("address_line1"),
        text_opt("address_line2"),
        text_opt("city"),
        text_opt("state"),
        text_opt("postal_code"),
        text_opt("country"),
        text_opt("customer_segment"),
        text_opt("loyalty_tier"),
        typed_opt("join_date", ColumnType::Date),
    ],
    truncate_before_load: true,
};

pub static PRODUCTS: TableDescriptor = TableDescriptor {
    entity: Entity::Products,
    table: "dim_product",
    columns: &[
        text("product_key"),
        text("product_name"),
        text_opt("product_description"),
        text("category"),
        text_opt("subcategory"),
        text_opt("brand"),
        text_opt("supplier"),
        typed("unit_price", ColumnType::Float64),
        typed("cost_price", ColumnType::Float64),
        typed("profit_margin", ColumnType::Float64),
        text_opt("size"),
        text_opt("color"),
        typed_opt("weight", ColumnType::Float64),
        text_opt("weight_unit"),
        typed("is_active", ColumnType::Boolean),
        typed_opt("discontinued_date", ColumnType::Date),
    ],
    truncate_before_load: true,
};

pub static LOCATIONS: TableDescriptor = TableDescriptor {
    entity: Entity::Locations,
    table: "dim_location",
    columns: &[
        text("location_key"),
        text("location_name"),
        text_opt("location_type"),
        text_opt("address_line1"),
        text_opt("city"),
        text_opt("state"),
        text_opt("postal_code"),
        text_opt("country"),
        text_opt("region"),
        typed_opt("latitude", ColumnType::Float64),
        typed_opt("longitude", ColumnType::Float64),
        typed("is_active", ColumnType::Boolean),
        typed_opt("open_date", ColumnType::Date),
    ],
    truncate_before_load: true,
};

pub static SALES: TableDescriptor = TableDescriptor {
    entity: Entity::Sales,
    table: "fact_sales",
    columns: &[
        text("order_number"),
        typed("order_line_number", ColumnType::Int32),
        text("customer_key"),
        text("product_key"),
        text("location_key"),
        typed("date_key", ColumnType::Int32),
        typed("order_date", ColumnType::Date),
        typed_opt("ship_date", ColumnType::Date),
        typed_opt("days_to_ship", ColumnType::Int32),
        text("payment_type"),
        text("payment_provider"),
        text("shipping_type"),
        text("carrier"),
        typed("quantity", ColumnType::Int32),
        typed("unit_price", ColumnType::Float64),
        typed("unit_cost", ColumnType::Float64),
        typed("discount_amount", ColumnType::Float64),
        typed("tax_amount", ColumnType::Float64),
        typed("shipping_cost", ColumnType::Float64),
        typed("line_total", ColumnType::Float64),
        typed("line_profit", ColumnType::Float64),
        typed("order_total", ColumnType::Float64),
        text("order_status"),
    ],
    truncate_before_load: true,
};

// ── Mapping ──────────────────────────────────────────────────────────

/// Cell spellings read as NULL (case-insensitive), besides the empty cell.
const NULL_TOKENS: [&str; 3] = ["null", "none", "nan"];

pub(crate) fn is_null_token(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || NULL_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t))
}

/// Project `table` onto `descriptor`'s columns (by header name) and coerce
/// every cell to the column type.
///
/// Extra source columns are ignored.
///
/// # Errors
///
/// Returns a [`ValidationError`] if a descriptor column is missing from
/// the table, a non-nullable cell is empty, or a cell does not parse as its
/// column type.
pub fn map_rows(descriptor: &TableDescriptor, table: &Table) -> Result<Vec<Row>, ValidationError> {
    let entity = descriptor.entity.as_str();
    let positions = descriptor
        .columns
        .iter()
        .map(|col| {
            table.column_index(col.name).ok_or_else(|| {
                ValidationError::table(entity, format!("missing column '{}'", col.name))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| {
            descriptor
                .columns
                .iter()
                .zip(&positions)
                .map(|(col, &pos)| {
                    let cell = cells.get(pos).map_or("", String::as_str);
                    coerce(col, cell).map_err(|msg| ValidationError::row(entity, idx + 1, msg))
                })
                .collect::<Result<Row, _>>()
        })
        .collect()
}

fn coerce(col: &Column, cell: &str) -> Result<Value, String> {
    let cell = cell.trim();
    if is_null_token(cell) {
        return if col.nullable {
            Ok(col.ty.null())
        } else {
            Err(format!("column {} is required", col.name))
        };
    }
    let invalid = |what: &str| format!("column {}: '{cell}' is not a valid {what}", col.name);

    Ok(match col.ty {
        ColumnType::Text => Value::text(cell),
        ColumnType::Int32 => {
            let n = parse_integer(cell).ok_or_else(|| invalid("integer"))?;
            Value::Int32(Some(i32::try_from(n).map_err(|_| invalid("32-bit integer"))?))
        }
        ColumnType::Int64 => Value::Int64(Some(parse_integer(cell).ok_or_else(|| invalid("integer"))?)),
        ColumnType::Float64 => {
            let n = cell
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| invalid("number"))?;
            Value::Float64(Some(n))
        }
        ColumnType::Boolean => Value::Boolean(Some(parse_bool(cell).ok_or_else(|| invalid("boolean"))?)),
        ColumnType::Date => Value::Date(Some(parse_date(cell).ok_or_else(|| invalid("date"))?)),
    })
}

/// `N`, or `N.0` as written by tools that round-trip integers through floats.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse_integer(cell: &str) -> Option<i64> {
    if let Ok(n) = cell.parse::<i64>() {
        return Some(n);
    }
    let f = cell.parse::<f64>().ok()?;
    // i64::MAX is not exactly representable; stay strictly inside the range.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e18 {
        Some(f as i64)
    } else {
        None
    }
}

pub(crate) fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// `YYYY-MM-DD`; a trailing time part (`T...` or ` ...`) is dropped.
pub(crate) fn parse_date(cell: &str) -> Option<NaiveDate> {
    let date_part = match cell.find(['T', ' ']) {
        Some(10) => &cell[..10],
        _ => cell,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        )
    }

    #[test]
    fn entities_are_in_load_order() {
        let tables: Vec<&str> = Entity::ALL.iter().map(|e| e.descriptor().table).collect();
        assert_eq!(tables, ecomdw_warehouse::schema::TABLES);
        for (i, entity) in Entity::ALL.iter().enumerate() {
            assert_eq!(entity.index(), i);
            assert_eq!(entity.descriptor().entity, *entity);
        }
    }

    #[test]
    fn every_descriptor_truncates_before_load() {
        assert!(Entity::ALL
            .iter()
            .all(|e| e.descriptor().truncate_before_load));
    }

    #[test]
    fn descriptor_columns_exist_in_sqlite_schema() {
        let mut wh = ecomdw_warehouse::SqliteWarehouse::in_memory().unwrap();
        for entity in Entity::ALL {
            let d = entity.descriptor();
            ecomdw_warehouse::Warehouse::query(&mut wh, &d.select_all_sql(), &d.column_types())
                .unwrap();
        }
    }

    #[test]
    fn insert_statement_uses_descriptor_order() {
        let stmt = SHIPPING_METHODS.insert_statement();
        assert_eq!(stmt.table, "dim_shipping_method");
        assert_eq!(stmt.columns, vec!["shipping_type", "carrier", "estimated_days"]);
    }

    #[test]
    fn map_rows_projects_by_header_and_coerces() {
        let t = table(
            &["carrier", "extra", "estimated_days", "shipping_type"],
            &[&["UPS", "x", "5.0", "Standard"]],
        );
        let rows = map_rows(&SHIPPING_METHODS, &t).unwrap();
        assert_eq!(
            rows,
            vec![vec![Value::from("Standard"), Value::from("UPS"), Value::from(5)]]
        );
    }

    #[test]
    fn empty_cells_become_typed_nulls_in_nullable_columns() {
        let t = table(
            &[
                "location_key",
                "location_name",
                "location_type",
                "address_line1",
                "city",
                "state",
                "postal_code",
                "country",
                "region",
                "latitude",
                "longitude",
                "is_active",
                "open_date",
            ],
            &[&["LOC-0001", "Austin Store", "", "", "Austin", "TX", "", "USA", "None", "", "NaN", "True", "2020-05-01 00:00:00"]],
        );
        let rows = map_rows(&LOCATIONS, &t).unwrap();
        let row = &rows[0];
        assert_eq!(row[2], Value::Text(None));
        assert_eq!(row[8], Value::Text(None));
        assert_eq!(row[9], Value::Float64(None));
        assert_eq!(row[10], Value::Float64(None));
        assert_eq!(row[11], Value::from(true));
        assert_eq!(row[12], Value::from(NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()));
    }

    #[test]
    fn required_cell_must_not_be_empty() {
        let t = table(&["payment_type", "payment_provider"], &[&["Credit Card", ""]]);
        let err = map_rows(&PAYMENT_METHODS, &t).unwrap_err();
        assert_eq!(err.row, Some(1));
        assert!(err.message.contains("payment_provider"), "got: {err}");
    }

    #[test]
    fn missing_column_is_reported() {
        let t = table(&["payment_type"], &[&["Credit Card"]]);
        let err = map_rows(&PAYMENT_METHODS, &t).unwrap_err();
        assert_eq!(err.row, None);
        assert!(err.message.contains("payment_provider"));
    }

    #[test]
    fn unparsable_cells_are_rejected() {
        let t = table(
            &["shipping_type", "carrier", "estimated_days"],
            &[&["Standard", "UPS", "5"], &["Express", "FedEx", "two"]],
        );
        let err = map_rows(&SHIPPING_METHODS, &t).unwrap_err();
        assert_eq!(err.row, Some(2));
        assert!(err.message.contains("'two'"));
    }

    #[test]
    fn scalar_parsers() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("12.0"), Some(12));
        assert_eq!(parse_integer("12.5"), None);
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("f"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(
            parse_date("2024-02-29T13:45:00"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("2023-02-29"), None);
    }

    #[test]
    fn validate_rows_checks_shape_and_nulls() {
        let ok = vec![vec![Value::from("Card"), Value::from("Visa")]];
        PAYMENT_METHODS.validate_rows(&ok).unwrap();

        let short = vec![vec![Value::from("Card")]];
        assert!(PAYMENT_METHODS.validate_rows(&short).is_err());

        let wrong_type = vec![vec![Value::from("Card"), Value::from(3)]];
        let err = PAYMENT_METHODS.validate_rows(&wrong_type).unwrap_err();
        assert!(err.message.contains("expects text"), "got: {err}");

        let null = vec![vec![Value::from("Card"), Value::Text(None)]];
        assert!(PAYMENT_METHODS.validate_rows(&null).is_err());
    }
}
