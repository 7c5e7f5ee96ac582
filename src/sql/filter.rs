//! Filter predicate building for listing WHERE clauses
//!
//! Converts `filter-<key>` request parameters into a parameterized SQL
//! fragment. Lookup is two-tier: the table's generic per-column filter map
//! first, then its hand-written overrides for join-spanning predicates.

use crate::catalog::{FilterDef, TableDef};
use crate::protocol::FormParams;
use crate::sql::sanitize::{LIKE_ESCAPE, contains_pattern};
use crate::types::SqlValue;

/// Prefix of filter parameters in listing requests
pub const FILTER_PREFIX: &str = "filter-";

/// Comparison applied by a generic filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `col LIKE ?` with the value wrapped in `%...%`, wildcards escaped
    Contains,
    /// `col = ?`
    Equals,
    /// `col >= ?`
    GreaterOrEqual,
}

/// A parameterized boolean SQL expression and its bound arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub fragment: String,
    pub args: Vec<SqlValue>,
}

impl Predicate {
    pub fn new(fragment: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            fragment: fragment.into(),
            args,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    /// AND-join non-empty predicates, keeping argument order
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut clauses = Vec::new();
        let mut args = Vec::new();
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            clauses.push(part.fragment);
            args.extend(part.args);
        }
        match clauses.len() {
            0 => Predicate::default(),
            1 => Predicate::new(clauses.remove(0), args),
            _ => Predicate::new(
                clauses
                    .into_iter()
                    .map(|c| format!("({})", c))
                    .collect::<Vec<_>>()
                    .join(" AND "),
                args,
            ),
        }
    }
}

/// Build the predicate for one generic filter
pub fn build_filter_clause(filter: &FilterDef, raw: &str) -> Predicate {
    match filter.op {
        FilterOp::Contains => Predicate::new(
            format!("{} LIKE ? {}", filter.column, LIKE_ESCAPE),
            vec![SqlValue::Text(contains_pattern(raw))],
        ),
        FilterOp::Equals => Predicate::new(
            format!("{} = ?", filter.column),
            vec![filter.sql_type.coerce(raw)],
        ),
        FilterOp::GreaterOrEqual => Predicate::new(
            format!("{} >= ?", filter.column),
            vec![filter.sql_type.coerce(raw)],
        ),
    }
}

/// Build the combined filter predicate of a listing request
///
/// Keys are visited in request order; only keys present with a non-empty
/// value contribute. Unrecognized keys are ignored.
pub fn build_filter_predicate(def: &TableDef, params: &FormParams) -> Predicate {
    let mut seen: Vec<&str> = Vec::new();
    let mut parts = Vec::new();

    for (name, value) in params.iter() {
        let Some(key) = name.strip_prefix(FILTER_PREFIX) else {
            continue;
        };
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if let Some(generic) = def.filters.iter().find(|f| f.key == key) {
            parts.push(build_filter_clause(generic, value));
        } else if let Some(custom) = def.overrides.iter().find(|o| o.key == key) {
            if let Some(predicate) = (custom.build)(value) {
                parts.push(predicate);
            }
        }
    }

    Predicate::and(parts)
}
