//! Static table catalog
//!
//! Hand-maintained definitions for every table the engine can list and edit:
//! own columns with their storage types and input hints, the joined listing
//! projection, the free-text search template, named filters, the label
//! annotations of the backing entity, and the autocomplete label source used
//! when another table references this one.

mod media;
mod misc;
mod series;

use crate::error::{GridError, Result};
use crate::fields::{NumericType, ScalarKind, SelectOption};
use crate::sql::filter::{FilterOp, Predicate};
use crate::sql::sanitize::{count_placeholders, validate_identifier};
use crate::types::SqlType;

/// Columns that are never editable, whatever the table
pub const ALWAYS_READONLY: &[&str] = &["id", "created_at", "updated_at"];

/// Input hint attached to a column, overriding type-based kind selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldHint {
    /// Derive the kind from name and type
    Auto,
    TextArea,
    Password,
    Email,
    Url,
    Hidden,
    /// Number input with a declared width and signedness
    Number(NumericType),
    Select(&'static [SelectOption]),
    MultiSelect(&'static [SelectOption]),
    /// Repeatable free-form rows stored as a JSON array
    List(ScalarKind),
    /// Repeatable selects sharing one option set, stored as a JSON array
    ListOfSelect(&'static [SelectOption]),
}

/// One literal column of a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub hint: FieldHint,
    pub help: Option<&'static str>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            hint: FieldHint::Auto,
            help: None,
        }
    }

    pub const fn hint(mut self, hint: FieldHint) -> Self {
        self.hint = hint;
        self
    }

    pub const fn help(mut self, text: &'static str) -> Self {
        self.help = Some(text);
        self
    }
}

pub(crate) const fn int(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Integer)
}

pub(crate) const fn real(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Real)
}

pub(crate) const fn text(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Text)
}

pub(crate) const fn boolean(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Boolean)
}

pub(crate) const fn date(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Date)
}

pub(crate) const fn timestamp(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Timestamp)
}

pub(crate) const fn json(name: &'static str) -> ColumnDef {
    ColumnDef::new(name, SqlType::Json)
}

/// Standard leading and trailing bookkeeping columns
pub(crate) const ID: ColumnDef = int("id");
pub(crate) const CREATED_AT: ColumnDef = timestamp("created_at");
pub(crate) const UPDATED_AT: ColumnDef = timestamp("updated_at");

/// One column of a joined listing projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// `table.col` or `table.col AS alias`
    pub expr: &'static str,
    pub sql_type: SqlType,
}

pub(crate) const fn proj(expr: &'static str, sql_type: SqlType) -> Projection {
    Projection { expr, sql_type }
}

/// Listing projection spanning joins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListingDef {
    pub from: &'static str,
    pub columns: &'static [Projection],
}

/// Free-text search clause; every `?` receives the wrapped search text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchDef {
    pub template: &'static str,
    pub args: usize,
}

/// Generic per-column filter reachable as `filter-<key>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDef {
    pub key: &'static str,
    pub column: &'static str,
    pub op: FilterOp,
    pub sql_type: SqlType,
}

pub(crate) const fn filter(
    key: &'static str,
    column: &'static str,
    op: FilterOp,
    sql_type: SqlType,
) -> FilterDef {
    FilterDef {
        key,
        column,
        op,
        sql_type,
    }
}

/// Hand-written predicate for filters the generic map cannot express
#[derive(Clone, Copy)]
pub struct FilterOverride {
    pub key: &'static str,
    pub build: fn(&str) -> Option<Predicate>,
}

impl std::fmt::Debug for FilterOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterOverride").field("key", &self.key).finish()
    }
}

/// Restricts autocomplete rows depending on which field asks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeScope {
    pub field: &'static str,
    pub column: &'static str,
    pub value: i64,
}

/// How rows of a table are labelled inside foreign-key selects
#[derive(Clone, Copy)]
pub struct LabelSource {
    pub from: &'static str,
    pub id_column: &'static str,
    /// Column matched against the typed search text
    pub search_column: &'static str,
    /// Selected in order and handed to `compose`
    pub parts: &'static [&'static str],
    pub compose: fn(&[String]) -> String,
    pub scopes: &'static [TypeScope],
}

impl std::fmt::Debug for LabelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelSource")
            .field("from", &self.from)
            .field("search_column", &self.search_column)
            .field("parts", &self.parts)
            .finish()
    }
}

impl LabelSource {
    pub fn scope_for(&self, field: &str) -> Option<&TypeScope> {
        self.scopes.iter().find(|s| s.field == field)
    }
}

/// Label made of the first part alone
pub(crate) fn label_first(parts: &[String]) -> String {
    parts.first().cloned().unwrap_or_default()
}

/// `Title (Extra)`; the parenthesised part is dropped when empty
pub(crate) fn label_with_suffix(parts: &[String]) -> String {
    match parts {
        [title, extra, ..] if !extra.is_empty() => format!("{} ({})", title, extra),
        [title, ..] => title.clone(),
        [] => String::new(),
    }
}

/// Static definition of one table
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    /// Name of the backing entity whose field annotations label columns
    pub entity: &'static str,
    pub columns: &'static [ColumnDef],
    /// `None` lists the own columns straight from the table
    pub listing: Option<ListingDef>,
    pub search: SearchDef,
    /// Table-specific columns excluded from edit forms
    pub readonly: &'static [&'static str],
    /// Label annotations keyed by structural field name
    pub annotations: &'static [(&'static str, &'static str)],
    pub filters: &'static [FilterDef],
    pub overrides: &'static [FilterOverride],
    pub label: Option<LabelSource>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_readonly(&self, column: &str) -> bool {
        ALWAYS_READONLY.contains(&column) || self.readonly.contains(&column)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

static TABLES: &[&TableDef] = &[
    &media::DBMOVIES,
    &media::DBMOVIE_TITLES,
    &media::MOVIES,
    &media::MOVIE_FILES,
    &media::MOVIE_HISTORIES,
    &media::MOVIE_FILE_UNMATCHEDS,
    &series::DBSERIES,
    &series::DBSERIE_ALTERNATES,
    &series::DBSERIE_EPISODES,
    &series::SERIES,
    &series::SERIE_EPISODES,
    &series::SERIE_EPISODE_FILES,
    &series::SERIE_EPISODE_HISTORIES,
    &series::SERIE_FILE_UNMATCHEDS,
    &misc::QUALITIES,
    &misc::JOB_HISTORIES,
    &misc::R_SSHISTORIES,
    &misc::INDEXER_FAILS,
];

/// Look up a table definition by name
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().copied().find(|t| t.name == name)
}

/// All known tables in catalog order
pub fn tables() -> impl Iterator<Item = &'static TableDef> {
    TABLES.iter().copied()
}

/// Check the catalog for configuration mistakes
///
/// Run once at engine construction. Fails on the first table whose search
/// template placeholder count disagrees with its declared argument count,
/// on invalid identifiers, or on filters pointing at nothing.
pub fn validate() -> Result<()> {
    for def in tables() {
        validate_identifier(def.name).map_err(GridError::configuration)?;

        if def.columns.first().map(|c| c.name) != Some("id") {
            return Err(GridError::configuration(format!(
                "Table '{}' must declare 'id' as its first column",
                def.name
            )));
        }

        for col in def.columns {
            validate_identifier(col.name).map_err(GridError::configuration)?;
        }

        let placeholders = count_placeholders(def.search.template);
        if placeholders != def.search.args {
            return Err(GridError::configuration(format!(
                "Search template of '{}' has {} placeholders but declares {} arguments",
                def.name, placeholders, def.search.args
            )));
        }

        for f in def.filters {
            if f.key.is_empty() || f.column.is_empty() {
                return Err(GridError::configuration(format!(
                    "Table '{}' has an incomplete filter definition",
                    def.name
                )));
            }
        }

        for readonly in def.readonly {
            if !def.has_column(readonly) {
                return Err(GridError::configuration(format!(
                    "Read-only column '{}' is not a column of '{}'",
                    readonly, def.name
                )));
            }
        }

        if let Some(listing) = &def.listing {
            if listing.columns.is_empty() {
                return Err(GridError::configuration(format!(
                    "Listing of '{}' projects no columns",
                    def.name
                )));
            }
        }
    }
    Ok(())
}
