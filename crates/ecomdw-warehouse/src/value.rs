//! Typed, nullable row values.
//!
//! Each variant carries an `Option` so a NULL still knows its SQL type;
//! drivers such as `postgres` refuse to bind an untyped NULL into a typed
//! column.

use std::fmt;

use chrono::NaiveDate;

/// Declared SQL type of a warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int32,
    Int64,
    Float64,
    Boolean,
    Text,
    Date,
}

impl ColumnType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Date => "date",
        }
    }

    /// The NULL of this type.
    #[must_use]
    pub fn null(self) -> Value {
        match self {
            Self::Int32 => Value::Int32(None),
            Self::Int64 => Value::Int64(None),
            Self::Float64 => Value::Float64(None),
            Self::Boolean => Value::Boolean(None),
            Self::Text => Value::Text(None),
            Self::Date => Value::Date(None),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single bound parameter or fetched cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Boolean(Option<bool>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
}

/// One warehouse row, in the target table's column order.
pub type Row = Vec<Value>;

impl Value {
    /// Non-null text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int32(_) => ColumnType::Int32,
            Self::Int64(_) => ColumnType::Int64,
            Self::Float64(_) => ColumnType::Float64,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Text(_) => ColumnType::Text,
            Self::Date(_) => ColumnType::Date,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Int32(v) => v.is_none(),
            Self::Int64(v) => v.is_none(),
            Self::Float64(v) => v.is_none(),
            Self::Boolean(v) => v.is_none(),
            Self::Text(v) => v.is_none(),
            Self::Date(v) => v.is_none(),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(Some(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(Some(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(Some(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(Some(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(Some(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(Some(value))
    }
}
