//! Core type definitions for the grid engine
//!
//! Includes SQL column types, bindable values, and the row cell decoder.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

// ============================================================================
// Column types
// ============================================================================

/// Declared storage type of a column
///
/// Only a hint for decoding cells and choosing a fallback input kind; SQLite
/// itself stores whatever it is given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Boolean,
    Date,
    Timestamp,
    /// JSON array stored as text
    Json,
}

impl SqlType {
    /// Column type used in CREATE TABLE statements
    pub fn to_sql_type(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text | SqlType::Json => "TEXT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "DATETIME",
        }
    }

    /// Coerce a raw request string into a bindable value for this column
    ///
    /// Falls back to text when the string does not parse, letting SQLite
    /// apply its own affinity rules.
    pub fn coerce(&self, raw: &str) -> SqlValue {
        let trimmed = raw.trim();
        match self {
            SqlType::Integer => trimmed
                .parse::<i64>()
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
            SqlType::Real => trimmed
                .parse::<f64>()
                .map(SqlValue::Float)
                .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
            SqlType::Boolean => match parse_bool(trimmed) {
                Some(b) => SqlValue::Bool(b),
                None => SqlValue::Text(raw.to_string()),
            },
            SqlType::Text | SqlType::Date | SqlType::Timestamp | SqlType::Json => {
                SqlValue::Text(raw.to_string())
            }
        }
    }
}

/// Strict boolean vocabulary shared by filters and checkbox parsing
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Values
// ============================================================================

/// A single value bound to or read from a statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Bool(b) => Some(*b as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Bind this value onto a query in order
    pub fn bind<'q>(
        self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
        }
    }

    /// Same as [`SqlValue::bind`] for scalar COUNT queries
    pub fn bind_scalar<'q, O>(
        self,
        query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Float(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
        }
    }
}

/// Default formatting, no locale or presentation logic
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => Ok(()),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Decode one cell of a result row
///
/// The storage class of the stored value wins; the declared type only turns
/// integers into booleans for boolean columns.
pub fn decode_cell(row: &SqliteRow, index: usize, declared: SqlType) -> SqlValue {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return SqlValue::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return SqlValue::Null,
    };

    match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => match row.try_get::<i64, _>(index) {
            Ok(v) if declared == SqlType::Boolean => SqlValue::Bool(v != 0),
            Ok(v) => SqlValue::Int(v),
            Err(_) => SqlValue::Null,
        },
        "REAL" => row
            .try_get::<f64, _>(index)
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|b| SqlValue::Text(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(SqlValue::Null),
        _ => row
            .try_get::<String, _>(index)
            .map(SqlValue::Text)
            .unwrap_or(SqlValue::Null),
    }
}
