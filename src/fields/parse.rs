//! Posted strings back into typed field values

use chrono::{NaiveDate, NaiveDateTime};

use super::{FieldKind, FieldValue, NumericType, ScalarKind};
use crate::error::{GridError, Result};
use crate::types::parse_bool;

/// Storage format of dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of timestamps, as written by `CURRENT_TIMESTAMP`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse every value posted for one field
///
/// `values` holds the posted strings in submission order; an absent key is an
/// empty slice. Scalars read the first value, except checkboxes where the
/// last value wins. Lists keep every non-empty value in order.
pub fn parse_field(kind: &FieldKind, values: &[&str]) -> Result<FieldValue> {
    let first = values.first().copied().unwrap_or("");

    match kind {
        FieldKind::Text
        | FieldKind::TextArea
        | FieldKind::Password
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Hidden
        | FieldKind::Select { .. } => Ok(FieldValue::Text(first.to_string())),
        FieldKind::Checkbox => Ok(FieldValue::Bool(parse_checkbox(
            values.last().copied().unwrap_or(""),
        ))),
        FieldKind::Number { numeric } => parse_number(*numeric, first),
        FieldKind::ForeignKey { .. } => {
            let raw = first.trim();
            if raw.is_empty() {
                return Ok(FieldValue::Null);
            }
            raw.parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| GridError::validation(format!("'{}' is not a valid id", raw)))
        }
        FieldKind::Date => parse_date(first),
        FieldKind::DateTime => parse_datetime(first),
        FieldKind::MultiSelect { .. } | FieldKind::ArrayOfSelect { .. } => {
            Ok(FieldValue::List(non_empty(values)))
        }
        FieldKind::Array {
            element: ScalarKind::Text,
        } => Ok(FieldValue::List(non_empty(values))),
        FieldKind::Array {
            element: ScalarKind::Integer,
        } => non_empty(values)
            .iter()
            .map(|v| {
                v.trim()
                    .parse::<i64>()
                    .map_err(|_| GridError::validation(format!("'{}' is not an integer", v)))
            })
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::IntList),
    }
}

/// Checkbox truthiness
///
/// Known spellings map directly; anything else counts as true only when it
/// is a non-zero number.
pub fn parse_checkbox(raw: &str) -> bool {
    if let Some(b) = parse_bool(raw) {
        return b;
    }
    raw.trim().parse::<f64>().map(|n| n != 0.0).unwrap_or(false)
}

/// Parse a number within the bounds of its declared type
pub fn parse_number(numeric: NumericType, raw: &str) -> Result<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }

    match numeric.bounds() {
        None => {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GridError::validation(format!("'{}' is not a number", raw)))?;
            if numeric == NumericType::F32 && value.abs() > f32::MAX as f64 {
                return Err(GridError::validation(format!("'{}' is out of range", raw)));
            }
            Ok(FieldValue::Float(value))
        }
        Some((min, max)) => {
            let value = raw
                .parse::<i64>()
                .map_err(|_| GridError::validation(format!("'{}' is not an integer", raw)))?;
            if value < min || value > max {
                return Err(GridError::validation(format!(
                    "{} is out of range {}..={}",
                    value, min, max
                )));
            }
            Ok(FieldValue::Int(value))
        }
    }
}

pub fn parse_date(raw: &str) -> Result<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| GridError::validation(format!("'{}' is not a date (YYYY-MM-DD)", raw)))?;
    Ok(FieldValue::Text(date.format(DATE_FORMAT).to_string()))
}

pub fn parse_datetime(raw: &str) -> Result<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(FieldValue::Null);
    }
    let parsed = DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .ok_or_else(|| GridError::validation(format!("'{}' is not a date and time", raw)))?;
    Ok(FieldValue::Text(parsed.format(DATETIME_FORMAT).to_string()))
}

fn non_empty(values: &[&str]) -> Vec<String> {
    values
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
        .collect()
}
