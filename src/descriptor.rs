//! Column/type descriptor resolution
//!
//! Turns a table name into the ordered column layout used by listings (read
//! columns, possibly joined and aliased) and by forms (write columns, only the
//! table's own literal columns). Display labels come from, in order: the
//! static field dictionary, the backing entity's label annotations, and a
//! mechanical title-casing of the column name.

use serde::Serialize;

use crate::catalog::{self, ColumnDef, TableDef};
use crate::sql::sanitize::{quote_identifier, split_alias, strip_alias};
use crate::types::SqlType;

/// One column as seen by a listing or a form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Projection expression, possibly `table.col AS alias`
    pub name: String,
    /// Externally visible key; never empty
    pub alias: String,
    pub sql_type: SqlType,
    pub display_name: String,
}

impl ColumnDescriptor {
    /// The projection expression without its alias, usable in ORDER BY
    pub fn expression(&self) -> String {
        strip_alias(&self.name)
    }
}

/// Storage and display shape of one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub name: String,
    /// Whether the table is present in the catalog
    pub known: bool,
    /// Source of the listing rows (may contain joins)
    pub from: String,
    /// Table used for the unconditional total count
    pub count_table: String,
    pub read_columns: Vec<ColumnDescriptor>,
    pub write_columns: Vec<ColumnDescriptor>,
    pub search_template: String,
    pub search_args: usize,
    pub entity: String,
}

impl TableDescriptor {
    pub fn has_search(&self) -> bool {
        !self.search_template.is_empty() && self.search_args > 0
    }

    /// Comma-separated projection for SELECT
    pub fn projection(&self) -> String {
        self.read_columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolve a table name into its descriptor
///
/// Unknown tables degrade to a single `id` column over the quoted name so
/// callers render an empty listing instead of failing.
pub fn resolve(table: &str) -> TableDescriptor {
    match catalog::table(table) {
        Some(def) => resolve_known(def),
        None => {
            tracing::debug!(
                target: "gridcrud::descriptor",
                "unknown table '{}', using minimal descriptor",
                table
            );
            let id = ColumnDescriptor {
                name: "id".to_string(),
                alias: "id".to_string(),
                sql_type: SqlType::Integer,
                display_name: display_name(None, "id"),
            };
            TableDescriptor {
                name: table.to_string(),
                known: false,
                from: quote_identifier(table),
                count_table: quote_identifier(table),
                read_columns: vec![id.clone()],
                write_columns: vec![id],
                search_template: String::new(),
                search_args: 0,
                entity: String::new(),
            }
        }
    }
}

fn resolve_known(def: &TableDef) -> TableDescriptor {
    let write_columns: Vec<ColumnDescriptor> = def
        .columns
        .iter()
        .map(|c| write_descriptor(def, c))
        .collect();

    let (from, read_columns) = match &def.listing {
        Some(listing) => (
            listing.from.to_string(),
            listing
                .columns
                .iter()
                .map(|p| {
                    let (_, alias) = split_alias(p.expr);
                    ColumnDescriptor {
                        name: p.expr.to_string(),
                        display_name: display_name(Some(def), &alias),
                        alias,
                        sql_type: p.sql_type,
                    }
                })
                .collect(),
        ),
        None => (def.name.to_string(), write_columns.clone()),
    };

    TableDescriptor {
        name: def.name.to_string(),
        known: true,
        from,
        count_table: def.name.to_string(),
        read_columns,
        write_columns,
        search_template: def.search.template.to_string(),
        search_args: def.search.args,
        entity: def.entity.to_string(),
    }
}

fn write_descriptor(def: &TableDef, col: &ColumnDef) -> ColumnDescriptor {
    ColumnDescriptor {
        name: col.name.to_string(),
        alias: col.name.to_string(),
        sql_type: col.sql_type,
        display_name: display_name(Some(def), col.name),
    }
}

/// Literal columns of the table that can be written, in declaration order
pub fn write_columns(table: &str) -> Vec<ColumnDescriptor> {
    resolve(table).write_columns
}

// ============================================================================
// Display names
// ============================================================================

/// Known domain fields and their labels
const FIELD_LABELS: &[(&str, &str)] = &[
    ("id", "ID"),
    ("created_at", "Created"),
    ("updated_at", "Updated"),
    ("title", "Title"),
    ("movie_title", "Movie"),
    ("year", "Year"),
    ("release_date", "Release Date"),
    ("adult", "Adult"),
    ("budget", "Budget"),
    ("genres", "Genres"),
    ("genre", "Genres"),
    ("original_language", "Original Language"),
    ("original_title", "Original Title"),
    ("overview", "Overview"),
    ("popularity", "Popularity"),
    ("revenue", "Revenue"),
    ("runtime", "Runtime"),
    ("spoken_languages", "Spoken Languages"),
    ("status", "Status"),
    ("tagline", "Tagline"),
    ("imdb_id", "IMDB ID"),
    ("thetvdb_id", "TheTVDB ID"),
    ("tvdb_id", "TVDB ID"),
    ("tvrage_id", "TVRage ID"),
    ("trakt_id", "Trakt ID"),
    ("facebook_id", "Facebook"),
    ("instagram_id", "Instagram"),
    ("twitter_id", "Twitter"),
    ("freebase_id", "Freebase ID"),
    ("url", "URL"),
    ("poster", "Poster"),
    ("banner", "Banner"),
    ("slug", "Slug"),
    ("region", "Region"),
    ("dbmovie_id", "Movie"),
    ("dbserie_id", "Series"),
    ("dbserie_episode_id", "Episode"),
    ("movie_id", "Movie Entry"),
    ("serie_id", "Series Entry"),
    ("serie_episode_id", "Episode Entry"),
    ("resolution_id", "Resolution"),
    ("quality_id", "Quality"),
    ("codec_id", "Codec"),
    ("audio_id", "Audio"),
    ("listname", "List"),
    ("rootpath", "Root Path"),
    ("quality_profile", "Quality Profile"),
    ("quality_reached", "Quality Reached"),
    ("missing", "Missing"),
    ("blacklisted", "Blacklisted"),
    ("dont_upgrade", "Don't Upgrade"),
    ("dont_search", "Don't Search"),
    ("search_specials", "Search Specials"),
    ("ignore_runtime", "Ignore Runtime"),
    ("lastscan", "Last Scan"),
    ("last_checked", "Last Checked"),
    ("location", "Location"),
    ("filename", "Filename"),
    ("filepath", "File Path"),
    ("extension", "Extension"),
    ("proper", "Proper"),
    ("extended", "Extended"),
    ("repack", "Repack"),
    ("height", "Height"),
    ("width", "Width"),
    ("indexer", "Indexer"),
    ("downloaded_at", "Downloaded"),
    ("seriename", "Series"),
    ("aliases", "Aliases"),
    ("network", "Network"),
    ("language", "Language"),
    ("identifier", "Identifier"),
    ("episode", "Episode"),
    ("season", "Season"),
    ("first_aired", "First Aired"),
    ("use_regex", "Use Regex"),
    ("regex", "Regex"),
    ("strings", "Match Strings"),
    ("priority", "Priority"),
    ("name", "Name"),
    ("type", "Type"),
    ("job_type", "Job"),
    ("job_category", "Category"),
    ("job_group", "Group"),
    ("started", "Started"),
    ("ended", "Ended"),
];

/// Structural field names that do not follow the mechanical conversion
const STRUCT_NAME_EXCEPTIONS: &[(&str, &str)] = &[
    ("freebase_m_id", "FreebaseMID"),
    ("r_sshistories", "RSSHistory"),
    ("imdb_id", "ImdbID"),
];

/// Convert a SQL column name to the entity's structural field name
///
/// `quality_profile` → `QualityProfile`, `dbmovie_id` → `DbmovieID`,
/// `url` → `URL`.
pub fn struct_field_name(column: &str) -> String {
    if let Some((_, mapped)) = STRUCT_NAME_EXCEPTIONS.iter().find(|(c, _)| *c == column) {
        return mapped.to_string();
    }
    column
        .split('_')
        .filter(|t| !t.is_empty())
        .map(|token| match token {
            "id" => "ID".to_string(),
            "url" => "URL".to_string(),
            other => title_case(other),
        })
        .collect()
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Mechanical label: split on `_`, title-case tokens, join with spaces
pub fn mechanical_label(column: &str) -> String {
    column
        .split('_')
        .filter(|t| !t.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human label for a column of a table
pub fn display_name(def: Option<&TableDef>, column: &str) -> String {
    if let Some((_, label)) = FIELD_LABELS.iter().find(|(c, _)| *c == column) {
        return label.to_string();
    }

    if let Some(def) = def {
        let field = struct_field_name(column);
        if let Some((_, label)) = def.annotations.iter().find(|(f, _)| *f == field) {
            return label.to_string();
        }
    }

    mechanical_label(column)
}
