//! Field kinds and typed form values
//!
//! Every editable column maps to one [`FieldKind`]. The kind decides how the
//! current value is rendered ([`render`]) and how posted strings are parsed
//! back into a typed [`FieldValue`] ([`parse`]).

pub mod parse;
pub mod render;

use serde::Serialize;

use crate::autocomplete;
use crate::catalog::{ColumnDef, FieldHint, TableDef};
use crate::descriptor::display_name;
use crate::types::{SqlType, SqlValue, parse_bool};

pub use parse::parse_field;
pub use render::{RenderContext, UiNode, collect_submission, render_field, render_form};

/// Integer columns that are booleans in disguise
pub const CHECKBOX_COLUMNS: &[&str] = &[
    "missing",
    "blacklisted",
    "quality_reached",
    "dont_upgrade",
    "dont_search",
    "search_specials",
    "ignore_runtime",
    "proper",
    "extended",
    "repack",
    "use_regex",
];

/// One entry of a select's option set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl SelectOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Element type of a repeatable free-form list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Text,
    Integer,
}

/// Declared numeric width and signedness of a number field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericType {
    pub fn is_float(&self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64)
    }

    /// Inclusive integer bounds; `None` for floats
    ///
    /// Unsigned 64-bit values are capped at `i64::MAX`, the widest SQLite
    /// integer.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            NumericType::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            NumericType::I16 => Some((i16::MIN as i64, i16::MAX as i64)),
            NumericType::I32 => Some((i32::MIN as i64, i32::MAX as i64)),
            NumericType::I64 => Some((i64::MIN, i64::MAX)),
            NumericType::U8 => Some((0, u8::MAX as i64)),
            NumericType::U16 => Some((0, u16::MAX as i64)),
            NumericType::U32 => Some((0, u32::MAX as i64)),
            NumericType::U64 => Some((0, i64::MAX)),
            NumericType::F32 | NumericType::F64 => None,
        }
    }
}

/// Input kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Password,
    Email,
    Url,
    Hidden,
    Number { numeric: NumericType },
    Checkbox,
    Date,
    DateTime,
    Select { options: &'static [SelectOption] },
    MultiSelect { options: &'static [SelectOption] },
    Array { element: ScalarKind },
    ArrayOfSelect { options: &'static [SelectOption] },
    /// Async select fed by the autocomplete endpoint of `table`
    ForeignKey { table: &'static str },
}

impl FieldKind {
    /// Kinds whose value is an ordered list of posted values
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FieldKind::MultiSelect { .. }
                | FieldKind::Array { .. }
                | FieldKind::ArrayOfSelect { .. }
        )
    }
}

/// Typed value of a form field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
    IntList(Vec<i64>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String items of a list value (integers formatted)
    pub fn list_items(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            FieldValue::IntList(items) => items.iter().map(|i| i.to_string()).collect(),
            FieldValue::Null => Vec::new(),
            other => {
                let single = other.to_input_string();
                if single.is_empty() { Vec::new() } else { vec![single] }
            }
        }
    }

    /// Default-formatted scalar used as an input's `value` attribute
    pub fn to_input_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(_) | FieldValue::IntList(_) => self.list_items().join(","),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::Text(s) => parse_bool(s).unwrap_or(false),
            _ => false,
        }
    }

    /// Interpret a stored cell as a value of `kind`
    pub fn from_stored(kind: &FieldKind, stored: SqlValue) -> FieldValue {
        if stored.is_null() {
            return match kind {
                FieldKind::Checkbox => FieldValue::Bool(false),
                FieldKind::Array {
                    element: ScalarKind::Integer,
                } => FieldValue::IntList(Vec::new()),
                k if k.is_list() => FieldValue::List(Vec::new()),
                _ => FieldValue::Null,
            };
        }

        match kind {
            FieldKind::Checkbox => FieldValue::Bool(match &stored {
                SqlValue::Bool(b) => *b,
                SqlValue::Int(i) => *i != 0,
                SqlValue::Float(f) => *f != 0.0,
                SqlValue::Text(s) => parse_bool(s).unwrap_or(false),
                SqlValue::Null => false,
            }),
            FieldKind::Array {
                element: ScalarKind::Integer,
            } => FieldValue::IntList(
                decode_list(&stored.to_string())
                    .iter()
                    .filter_map(|s| s.trim().parse().ok())
                    .collect(),
            ),
            k if k.is_list() => FieldValue::List(decode_list(&stored.to_string())),
            FieldKind::Number { numeric } if numeric.is_float() => match stored {
                SqlValue::Int(i) => FieldValue::Float(i as f64),
                SqlValue::Float(f) => FieldValue::Float(f),
                other => other
                    .to_string()
                    .trim()
                    .parse()
                    .map(FieldValue::Float)
                    .unwrap_or(FieldValue::Null),
            },
            FieldKind::Number { .. } | FieldKind::ForeignKey { .. } => match stored.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Text(stored.to_string()),
            },
            _ => match stored {
                SqlValue::Int(i) => FieldValue::Int(i),
                SqlValue::Float(f) => FieldValue::Float(f),
                SqlValue::Bool(b) => FieldValue::Bool(b),
                SqlValue::Text(s) => FieldValue::Text(s),
                SqlValue::Null => FieldValue::Null,
            },
        }
    }

    /// Convert to a bindable value for a column of `sql_type`
    ///
    /// Lists are stored as JSON arrays.
    pub fn into_sql(self, sql_type: SqlType) -> crate::error::Result<SqlValue> {
        Ok(match self {
            FieldValue::Null => SqlValue::Null,
            FieldValue::Text(s) => sql_type.coerce(&s),
            FieldValue::Int(i) => match sql_type {
                SqlType::Real => SqlValue::Float(i as f64),
                SqlType::Boolean => SqlValue::Bool(i != 0),
                _ => SqlValue::Int(i),
            },
            FieldValue::Float(f) => SqlValue::Float(f),
            FieldValue::Bool(b) => match sql_type {
                SqlType::Boolean => SqlValue::Bool(b),
                _ => SqlValue::Int(b as i64),
            },
            FieldValue::List(items) => SqlValue::Text(serde_json::to_string(&items)?),
            FieldValue::IntList(items) => SqlValue::Text(serde_json::to_string(&items)?),
        })
    }
}

/// Decode a stored list: a JSON array, or comma-separated text for legacy rows
fn decode_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
        return values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
    }
    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// One field of an edit form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    /// Column name; posted back as `field-<name>`
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub value: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Label of the referenced record, when it could be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_label: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: FieldValue) -> Self {
        let name = name.into();
        Self {
            label: display_name(None, &name),
            name,
            kind,
            value,
            help: None,
            reference_label: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Decide the input kind of a column
///
/// Order: explicit hint, checkbox allow-list or boolean type, foreign-key
/// reference, then the storage type.
pub fn field_kind(col: &ColumnDef) -> FieldKind {
    match col.hint {
        FieldHint::TextArea => return FieldKind::TextArea,
        FieldHint::Password => return FieldKind::Password,
        FieldHint::Email => return FieldKind::Email,
        FieldHint::Url => return FieldKind::Url,
        FieldHint::Hidden => return FieldKind::Hidden,
        FieldHint::Number(numeric) => return FieldKind::Number { numeric },
        FieldHint::Select(options) => return FieldKind::Select { options },
        FieldHint::MultiSelect(options) => return FieldKind::MultiSelect { options },
        FieldHint::List(element) => return FieldKind::Array { element },
        FieldHint::ListOfSelect(options) => return FieldKind::ArrayOfSelect { options },
        FieldHint::Auto => {}
    }

    if CHECKBOX_COLUMNS.contains(&col.name) || col.sql_type == SqlType::Boolean {
        return FieldKind::Checkbox;
    }

    if let Some(target) = autocomplete::reference_target(col.name) {
        return FieldKind::ForeignKey { table: target.name };
    }

    match col.sql_type {
        SqlType::Integer => FieldKind::Number {
            numeric: NumericType::I64,
        },
        SqlType::Real => FieldKind::Number {
            numeric: NumericType::F64,
        },
        SqlType::Date => FieldKind::Date,
        SqlType::Timestamp => FieldKind::DateTime,
        SqlType::Json => FieldKind::Array {
            element: ScalarKind::Text,
        },
        SqlType::Text | SqlType::Boolean => FieldKind::Text,
    }
}

/// Build the edit-form fields of a table from stored values
///
/// `id`, `created_at`, `updated_at` and the table's read-only columns are
/// never part of the form. Missing values render empty.
pub fn form_fields(
    def: &TableDef,
    stored: &std::collections::HashMap<String, SqlValue>,
) -> Vec<FieldDefinition> {
    def.columns
        .iter()
        .filter(|c| !def.is_readonly(c.name))
        .map(|col| {
            let kind = field_kind(col);
            let value = FieldValue::from_stored(
                &kind,
                stored.get(col.name).cloned().unwrap_or(SqlValue::Null),
            );
            FieldDefinition {
                name: col.name.to_string(),
                label: display_name(Some(def), col.name),
                kind,
                value,
                help: col.help.map(str::to_string),
                reference_label: None,
            }
        })
        .collect()
}
