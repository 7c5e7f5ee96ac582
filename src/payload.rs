//! Posted record payloads
//!
//! Collects the `field-<column>` parameters of an insert or update into an
//! ordered list of typed column values, validated against the table's own
//! writable columns before any SQL is built.

use crate::catalog::TableDef;
use crate::error::{GridError, Result};
use crate::fields::{FieldKind, FieldValue, field_kind, parse_field};
use crate::protocol::{FIELD_PREFIX, FormParams};
use crate::types::SqlValue;

/// Typed column values of one insert or update
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPayload {
    pub table: &'static str,
    pub values: Vec<(&'static str, FieldValue)>,
}

impl RecordPayload {
    /// Parse posted parameters for `def`
    ///
    /// - `id`, `created_at`, `updated_at`, table read-only columns and the
    ///   CSRF token are dropped
    /// - other parameters without the `field-` prefix are ignored
    /// - a prefixed name that is not a column of the table is rejected
    /// - empty values are omitted; checkboxes always carry a value
    pub fn from_params(
        def: &'static TableDef,
        params: &FormParams,
        csrf_field: &str,
    ) -> Result<Self> {
        let mut values = Vec::new();

        for key in params.keys() {
            let Some(column) = key.strip_prefix(FIELD_PREFIX) else {
                continue;
            };
            if column == csrf_field || def.is_readonly(column) {
                continue;
            }
            let Some(col) = def.column(column) else {
                return Err(GridError::unknown_column(def.name, column));
            };

            let posted = params.get_all(key);
            let kind = field_kind(col);
            if kind != FieldKind::Checkbox && posted.iter().all(|v| v.is_empty()) {
                continue;
            }

            let value = parse_field(&kind, &posted).map_err(|e| match e {
                GridError::Validation(msg) => {
                    GridError::validation(format!("{}: {}", col.name, msg))
                }
                other => other,
            })?;
            values.push((col.name, value));
        }

        Ok(Self {
            table: def.name,
            values,
        })
    }

    /// Posted columns in submission order
    pub fn columns(&self) -> Vec<&'static str> {
        self.values.iter().map(|(c, _)| *c).collect()
    }

    /// Bindable values in column order, converted per column storage type
    pub fn into_sql_values(self, def: &TableDef) -> Result<Vec<(&'static str, SqlValue)>> {
        self.values
            .into_iter()
            .map(|(column, value)| {
                let sql_type = def
                    .column(column)
                    .map(|c| c.sql_type)
                    .ok_or_else(|| GridError::unknown_column(def.name, column))?;
                Ok((column, value.into_sql(sql_type)?))
            })
            .collect()
    }
}
