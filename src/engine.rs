//! GridEngine - Main entry point for listing and editing catalog tables
//!
//! This module provides the `GridEngine` struct that executes listings,
//! foreign-key lookups and record mutations against a SQLite database.

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqlitePool};
use sqlx::{Sqlite, query::Query, query::QueryScalar};

use crate::autocomplete::{
    AutocompleteItem, AutocompletePage, ReferenceRelation, lookup_query, search_query,
};
use crate::catalog::{self, TableDef};
use crate::config::EngineConfig;
use crate::descriptor::resolve;
use crate::error::{GridError, Result};
use crate::fields::{
    FieldDefinition, FieldKind, FieldValue, RenderContext, UiNode, form_fields, render_form,
};
use crate::payload::RecordPayload;
use crate::protocol::FormParams;
use crate::sql::ddl::DdlGenerator;
use crate::sql::listing::{ListingQuery, build_listing};
use crate::sql::sanitize::quote_identifier;
use crate::types::{SqlValue, decode_cell};

/// One page of a listing with typed cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    /// Rows of the primary table, ignoring search and filters
    pub total: i64,
    /// Rows matching search and filters
    pub filtered: i64,
    /// Cells in visible-column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl ListingPage {
    /// Stringify cells and append the empty action cell to every row
    pub fn into_data(self) -> Vec<Vec<String>> {
        self.rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                cells.push(String::new());
                cells
            })
            .collect()
    }
}

/// Rendered edit form of one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub table: String,
    /// `None` for a blank insert form
    pub id: Option<i64>,
    pub fields: Vec<FieldDefinition>,
    #[serde(skip)]
    pub node: UiNode,
    pub html: String,
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = arg.bind(query);
    }
    query
}

fn bind_all_scalar<'q>(
    mut query: QueryScalar<'q, Sqlite, i64, SqliteArguments<'q>>,
    args: Vec<SqlValue>,
) -> QueryScalar<'q, Sqlite, i64, SqliteArguments<'q>> {
    for arg in args {
        query = arg.bind_scalar(query);
    }
    query
}

/// Schema-driven listing and editing engine over SQLite
///
/// Stateless between calls: holds only the connection pool and immutable
/// configuration, so one instance can serve concurrent requests.
pub struct GridEngine {
    /// Database connection pool
    pool: SqlitePool,
    /// Engine configuration
    config: EngineConfig,
}

impl GridEngine {
    /// Create a new GridEngine from configuration
    ///
    /// This will:
    /// 1. Check the static catalog for configuration mistakes
    /// 2. Connect to the database
    pub async fn new(config: EngineConfig) -> Result<Self> {
        catalog::validate()?;
        let pool = SqlitePool::connect(&config.database_url).await?;
        Ok(Self { pool, config })
    }

    /// Create a new GridEngine from an existing pool
    pub fn from_pool(pool: SqlitePool, config: EngineConfig) -> Result<Self> {
        catalog::validate()?;
        Ok(Self { pool, config })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create every catalog table and its reference indexes if missing
    pub async fn ensure_tables(&self) -> Result<()> {
        for statement in DdlGenerator::new().generate_schema(catalog::tables()) {
            self.timed(sqlx::query(&statement).execute(&self.pool)).await?;
        }
        tracing::info!(
            target: "gridcrud::ddl",
            tables = catalog::tables().count(),
            "catalog tables ensured"
        );
        Ok(())
    }

    /// Bound one storage call by the configured timeout
    async fn timed<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.config.query_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GridError::Timeout(self.config.query_timeout)),
        }
    }

    async fn count(&self, sql: &str, args: Vec<SqlValue>) -> Result<i64> {
        let query = bind_all_scalar(sqlx::query_scalar::<_, i64>(sql), args);
        self.timed(query.fetch_one(&self.pool)).await
    }

    fn table_def(table: &str) -> Result<&'static TableDef> {
        catalog::table(table)
            .ok_or_else(|| GridError::validation(format!("Unknown table '{}'", table)))
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Run one listing page
    ///
    /// Unknown tables yield an empty page without touching the database.
    /// The page length never exceeds `max_page_length`, whatever the query
    /// asks for.
    pub async fn list(&self, table: &str, query: &ListingQuery) -> Result<ListingPage> {
        let desc = resolve(table);
        if !desc.known {
            tracing::warn!(
                target: "gridcrud::listing",
                table,
                "listing requested for unknown table"
            );
            return Ok(ListingPage::default());
        }

        let statements = build_listing(&desc, query, self.config.max_page_length);
        tracing::debug!(
            target: "gridcrud::listing",
            table,
            sql = %statements.rows_sql,
            args = statements.where_args.len(),
            "running listing"
        );

        let total = self.count(&statements.total_sql, Vec::new()).await?;

        let query = bind_all(sqlx::query(&statements.rows_sql), statements.row_args());
        let rows = self.timed(query.fetch_all(&self.pool)).await?;
        let rows: Vec<Vec<SqlValue>> = rows
            .iter()
            .map(|row| {
                desc.read_columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| decode_cell(row, i, col.sql_type))
                    .collect()
            })
            .collect();

        let filtered = match &statements.filtered_sql {
            Some(sql) => self.count(sql, statements.where_args.clone()).await?,
            None => total,
        };

        Ok(ListingPage {
            total,
            filtered,
            rows,
        })
    }

    // =========================================================================
    // Foreign-key autocomplete
    // =========================================================================

    /// Paged substring search over the table referenced by `field`
    ///
    /// Fields that do not reference a labelled table yield an empty page.
    pub async fn autocomplete_search(
        &self,
        table: &str,
        field: &str,
        query: &str,
        page: i64,
    ) -> Result<AutocompletePage> {
        let Some(relation) = ReferenceRelation::resolve(table, field) else {
            tracing::debug!(
                target: "gridcrud::autocomplete",
                table,
                field,
                "not a reference field"
            );
            return Ok(AutocompletePage::default());
        };

        let page_size = self.config.autocomplete_page_size;
        let lookup = search_query(&relation, query, page, page_size);
        let query = bind_all(sqlx::query(&lookup.sql), lookup.args);
        let rows = self.timed(query.fetch_all(&self.pool)).await?;
        let items = rows
            .iter()
            .map(|row| AutocompleteItem::from_row(row, relation.source))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(AutocompletePage::from_fetched(items, page_size))
    }

    /// Resolve one referenced record for preselection
    ///
    /// Non-numeric and dangling ids resolve to `None`.
    pub async fn autocomplete_lookup(
        &self,
        table: &str,
        field: &str,
        id: &str,
    ) -> Result<Option<AutocompleteItem>> {
        let Ok(id) = id.trim().parse::<i64>() else {
            return Ok(None);
        };
        let Some(relation) = ReferenceRelation::resolve(table, field) else {
            return Ok(None);
        };

        let lookup = lookup_query(&relation, id);
        let query = bind_all(sqlx::query(&lookup.sql), lookup.args);
        let row = self.timed(query.fetch_optional(&self.pool)).await?;
        Ok(row
            .map(|r| AutocompleteItem::from_row(&r, relation.source))
            .transpose()?)
    }

    // =========================================================================
    // Records
    // =========================================================================

    async fn exists(&self, def: &TableDef, id: i64) -> Result<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE id = ?",
            quote_identifier(def.name)
        );
        Ok(self.count(&sql, vec![SqlValue::Int(id)]).await? > 0)
    }

    /// Load the own columns of one record
    pub async fn get_record(
        &self,
        table: &str,
        id: i64,
    ) -> Result<Option<HashMap<String, SqlValue>>> {
        let def = Self::table_def(table)?;
        let columns: Vec<String> = def.columns.iter().map(|c| quote_identifier(c.name)).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            columns.join(", "),
            quote_identifier(def.name)
        );

        let row = self.timed(sqlx::query(&sql).bind(id).fetch_optional(&self.pool)).await?;
        Ok(row.map(|row| {
            def.columns
                .iter()
                .enumerate()
                .map(|(i, col)| (col.name.to_string(), decode_cell(&row, i, col.sql_type)))
                .collect()
        }))
    }

    /// Insert a record from posted `field-` parameters, returning its id
    pub async fn insert(&self, table: &str, params: &FormParams) -> Result<i64> {
        let def = Self::table_def(table)?;
        let payload = RecordPayload::from_params(def, params, &self.config.csrf_field)?;
        tracing::debug!(
            target: "gridcrud::mutation",
            table,
            columns = ?payload.columns(),
            "inserting record"
        );
        let values = payload.into_sql_values(def)?;

        let mut columns: Vec<String> = values.iter().map(|(c, _)| quote_identifier(c)).collect();
        let mut placeholders: Vec<&str> = vec!["?"; values.len()];
        for stamp in ["created_at", "updated_at"] {
            if def.has_column(stamp) {
                columns.push(quote_identifier(stamp));
                placeholders.push("CURRENT_TIMESTAMP");
            }
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(def.name))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_identifier(def.name),
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let args = values.into_iter().map(|(_, v)| v).collect();
        let result = self.timed(bind_all(sqlx::query(&sql), args).execute(&self.pool)).await?;
        let id = result.last_insert_rowid();

        tracing::info!(target: "gridcrud::mutation", table, id, "record inserted");
        Ok(id)
    }

    /// Update a record from posted `field-` parameters
    ///
    /// Fails with [`GridError::RecordNotFound`] when the id does not exist.
    /// A payload without columns leaves the row untouched.
    pub async fn update(&self, table: &str, id: i64, params: &FormParams) -> Result<()> {
        let def = Self::table_def(table)?;
        let payload = RecordPayload::from_params(def, params, &self.config.csrf_field)?;
        let columns = payload.columns();
        let values = payload.into_sql_values(def)?;

        if !self.exists(def, id).await? {
            return Err(GridError::RecordNotFound);
        }
        if values.is_empty() {
            tracing::debug!(target: "gridcrud::mutation", table, id, "update without columns");
            return Ok(());
        }

        let mut assignments: Vec<String> = values
            .iter()
            .map(|(c, _)| format!("{} = ?", quote_identifier(c)))
            .collect();
        if def.has_column("updated_at") {
            assignments.push(format!("{} = CURRENT_TIMESTAMP", quote_identifier("updated_at")));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            quote_identifier(def.name),
            assignments.join(", ")
        );
        let mut args: Vec<SqlValue> = values.into_iter().map(|(_, v)| v).collect();
        args.push(SqlValue::Int(id));

        self.timed(bind_all(sqlx::query(&sql), args).execute(&self.pool)).await?;

        tracing::info!(
            target: "gridcrud::mutation",
            table,
            id,
            columns = ?columns,
            "record updated"
        );
        Ok(())
    }

    /// Delete a record, checking that it exists first
    pub async fn delete(&self, table: &str, id: i64) -> Result<()> {
        let def = Self::table_def(table)?;
        if !self.exists(def, id).await? {
            return Err(GridError::RecordNotFound);
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", quote_identifier(def.name));
        self.timed(sqlx::query(&sql).bind(id).execute(&self.pool)).await?;

        tracing::info!(target: "gridcrud::mutation", table, id, "record deleted");
        Ok(())
    }

    // =========================================================================
    // Edit forms
    // =========================================================================

    /// Build the edit form of a record, or a blank form when `id` is `None`
    ///
    /// Foreign keys are labelled through the autocomplete lookup. A dangling
    /// reference renders as an empty select.
    pub async fn edit_form(&self, table: &str, id: Option<i64>) -> Result<EditForm> {
        let def = Self::table_def(table)?;
        let stored = match id {
            Some(id) => self
                .get_record(table, id)
                .await?
                .ok_or(GridError::RecordNotFound)?,
            None => HashMap::new(),
        };

        let mut fields = form_fields(def, &stored);
        for field in fields
            .iter_mut()
            .filter(|f| matches!(f.kind, FieldKind::ForeignKey { .. }))
        {
            let FieldValue::Int(ref_id) = field.value else {
                continue;
            };
            match self
                .autocomplete_lookup(table, &field.name, &ref_id.to_string())
                .await
            {
                Ok(Some(item)) => field.reference_label = Some(item.label),
                Ok(None) => {
                    tracing::debug!(
                        target: "gridcrud::autocomplete",
                        table,
                        field = %field.name,
                        ref_id,
                        "dangling reference"
                    );
                    field.value = FieldValue::Null;
                }
                Err(e) => {
                    tracing::warn!(
                        target: "gridcrud::autocomplete",
                        table,
                        field = %field.name,
                        error = %e,
                        "reference label lookup failed"
                    );
                }
            }
        }

        let node = render_form(&fields, &RenderContext::new(&self.config, table));
        Ok(EditForm {
            table: table.to_string(),
            id,
            html: node.to_html(),
            node,
            fields,
        })
    }
}
