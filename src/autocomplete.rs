//! Foreign-key autocomplete
//!
//! Maps `_id` columns to the table they reference and builds the bounded
//! lookups behind async selects: paged substring search over the referenced
//! table's label column, and exact resolution of one id for preselection.

use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::catalog::{self, LabelSource, TableDef, TypeScope};
use crate::protocol::{AutocompleteResponse, AutocompleteResult, Pagination};
use crate::sql::sanitize::{LIKE_ESCAPE, contains_pattern};
use crate::types::SqlValue;

/// Reference columns whose target cannot be guessed from the name
const REFERENCES: &[(&str, &str)] = &[
    ("dbmovie_id", "dbmovies"),
    ("dbserie_id", "dbseries"),
    ("dbserie_episode_id", "dbserie_episodes"),
    ("serie_id", "series"),
    ("serie_episode_id", "serie_episodes"),
    ("movie_id", "movies"),
    ("resolution_id", "qualities"),
    ("quality_id", "qualities"),
    ("codec_id", "qualities"),
    ("audio_id", "qualities"),
];

/// `_id` columns holding external identifiers, not row references
const NATURAL_KEYS: &[&str] = &[
    "imdb_id",
    "tvdb_id",
    "thetvdb_id",
    "moviedb_id",
    "trakt_id",
    "tvrage_id",
    "freebase_id",
    "freebase_m_id",
    "facebook_id",
    "instagram_id",
    "twitter_id",
    "last_id",
];

/// Name of the table a column refers to, if it looks like a reference
///
/// Dictionary entries win; otherwise the stem before `_id` is pluralized.
/// The result is not checked against the catalog.
pub fn reference_table(column: &str) -> Option<String> {
    if NATURAL_KEYS.contains(&column) {
        return None;
    }
    if let Some((_, table)) = REFERENCES.iter().find(|(c, _)| *c == column) {
        return Some(table.to_string());
    }
    let stem = column.strip_suffix("_id")?;
    if stem.is_empty() {
        return None;
    }
    Some(pluralize(stem))
}

/// Catalog table a column refers to, when that table can label its rows
pub fn reference_target(column: &str) -> Option<&'static TableDef> {
    let name = reference_table(column)?;
    catalog::table(&name).filter(|def| def.label.is_some())
}

fn pluralize(stem: &str) -> String {
    if let Some(base) = stem.strip_suffix('y') {
        if !base.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", base);
        }
    }
    if stem.ends_with('s') || stem.ends_with('x') || stem.ends_with("ch") || stem.ends_with("sh") {
        return format!("{}es", stem);
    }
    format!("{}s", stem)
}

/// A resolved foreign-key field: where its options come from
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRelation {
    pub column: &'static str,
    pub target: &'static TableDef,
    pub source: &'static LabelSource,
    /// Implicit type filter for shared lookup tables
    pub scope: Option<&'static TypeScope>,
}

impl ReferenceRelation {
    /// Resolve `field` of `table`; `None` when either is unknown or the
    /// field is not a reference
    pub fn resolve(table: &str, field: &str) -> Option<Self> {
        let owner = catalog::table(table)?;
        let column = owner.column(field)?;
        let target = reference_target(column.name)?;
        let source = target.label.as_ref()?;
        Some(Self {
            column: column.name,
            target,
            source,
            scope: source.scope_for(column.name),
        })
    }
}

// ============================================================================
// Queries
// ============================================================================

/// SQL text plus positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct LookupQuery {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

fn label_projection(source: &LabelSource) -> String {
    let mut columns = vec![format!("{} AS id", source.id_column)];
    for (i, part) in source.parts.iter().enumerate() {
        columns.push(format!("COALESCE(CAST({} AS TEXT), '') AS label_{}", part, i));
    }
    columns.join(", ")
}

/// One page of a substring search, fetching `page_size + 1` rows
///
/// The extra row only signals that another page exists.
pub fn search_query(
    relation: &ReferenceRelation,
    query: &str,
    page: i64,
    page_size: i64,
) -> LookupQuery {
    let source = relation.source;
    let mut clauses = Vec::new();
    let mut args = Vec::new();

    if !query.is_empty() {
        clauses.push(format!("{} LIKE ? {}", source.search_column, LIKE_ESCAPE));
        args.push(SqlValue::Text(contains_pattern(query)));
    }
    if let Some(scope) = relation.scope {
        clauses.push(format!("{} = ?", scope.column));
        args.push(SqlValue::Int(scope.value));
    }

    let mut sql = format!("SELECT {} FROM {}", label_projection(source), source.from);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(
        " ORDER BY {}, {} LIMIT ?, ?",
        source.search_column, source.id_column
    ));

    let page = page.max(1);
    args.push(SqlValue::Int((page - 1).saturating_mul(page_size)));
    args.push(SqlValue::Int(page_size + 1));

    LookupQuery { sql, args }
}

/// Exact lookup of one row for preselection
///
/// Type scopes do not apply: a stored id resolves to its row whatever its
/// type.
pub fn lookup_query(relation: &ReferenceRelation, id: i64) -> LookupQuery {
    let source = relation.source;
    LookupQuery {
        sql: format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
            label_projection(source),
            source.from,
            source.id_column
        ),
        args: vec![SqlValue::Int(id)],
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteItem {
    pub id: i64,
    pub label: String,
}

impl AutocompleteItem {
    /// Decode a row produced by [`search_query`] or [`lookup_query`]
    pub fn from_row(row: &SqliteRow, source: &LabelSource) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get(0)?;
        let mut parts = Vec::with_capacity(source.parts.len());
        for i in 0..source.parts.len() {
            parts.push(row.try_get::<String, _>(i + 1)?);
        }
        Ok(Self {
            id,
            label: (source.compose)(&parts),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AutocompletePage {
    pub results: Vec<AutocompleteItem>,
    pub has_more: bool,
}

impl AutocompletePage {
    /// Trim a `page_size + 1` fetch down to one page
    pub fn from_fetched(mut items: Vec<AutocompleteItem>, page_size: i64) -> Self {
        let size = usize::try_from(page_size).unwrap_or(0);
        let has_more = items.len() > size;
        items.truncate(size);
        Self {
            results: items,
            has_more,
        }
    }
}

impl From<AutocompletePage> for AutocompleteResponse {
    fn from(page: AutocompletePage) -> Self {
        AutocompleteResponse {
            results: page
                .results
                .into_iter()
                .map(|item| AutocompleteResult {
                    id: item.id,
                    text: item.label,
                })
                .collect(),
            pagination: Pagination {
                more: page.has_more,
            },
        }
    }
}
