//! DDL Generation for catalog tables
//!
//! Generates SQLite DDL statements creating the tables described by the
//! static catalog. Used to bootstrap empty databases and test fixtures.

use crate::autocomplete::reference_table;
use crate::catalog::{ColumnDef, TableDef};
use crate::fields::CHECKBOX_COLUMNS;
use crate::sql::sanitize::quote_identifier;
use crate::types::SqlType;

/// DDL Generator for catalog tables
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlGenerator;

impl DdlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate CREATE TABLE statement for one catalog table
    ///
    /// `id` becomes the integer row key; `created_at` and `updated_at`
    /// default to the insertion time.
    pub fn generate_create_table(&self, def: &TableDef) -> String {
        let column_defs: Vec<String> = def
            .columns
            .iter()
            .map(Self::format_column_definition)
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(def.name),
            column_defs.join(", ")
        )
    }

    /// Generate CREATE INDEX statement on a single column
    pub fn generate_create_index(&self, table_name: &str, column: &str) -> String {
        let quoted_index = quote_identifier(&format!("idx_{}_{}", table_name, column));
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {}({})",
            quoted_index,
            quote_identifier(table_name),
            quote_identifier(column)
        )
    }

    /// Indexes on every reference column of a table
    pub fn generate_reference_indexes(&self, def: &TableDef) -> Vec<String> {
        def.columns
            .iter()
            .filter(|c| c.name != "id" && reference_table(c.name).is_some())
            .map(|c| self.generate_create_index(def.name, c.name))
            .collect()
    }

    /// Every statement needed to create the catalog's tables, in order
    pub fn generate_schema<'t>(
        &self,
        tables: impl IntoIterator<Item = &'t TableDef>,
    ) -> Vec<String> {
        let mut statements = Vec::new();
        for def in tables {
            statements.push(self.generate_create_table(def));
            statements.extend(self.generate_reference_indexes(def));
        }
        statements
    }

    /// Format a single column definition for CREATE TABLE
    pub fn format_column_definition(col: &ColumnDef) -> String {
        let name = quote_identifier(col.name);
        match col.name {
            "id" => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", name),
            "created_at" | "updated_at" => {
                format!("{} DATETIME DEFAULT CURRENT_TIMESTAMP", name)
            }
            _ if col.sql_type == SqlType::Boolean || CHECKBOX_COLUMNS.contains(&col.name) => {
                format!("{} {} DEFAULT 0", name, col.sql_type.to_sql_type())
            }
            _ => format!("{} {}", name, col.sql_type.to_sql_type()),
        }
    }
}
