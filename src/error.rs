//! Error types for grid engine operations

use thiserror::Error;

/// Errors that can occur while listing, rendering or mutating records
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Update or delete against an id that does not exist.
    #[error("record not found")]
    RecordNotFound,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error should be reported to the caller as a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound)
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
