//! # gridcrud
//!
//! A schema-driven listing and editing engine for SQLite media-library tables.
//!
//! One generic mechanism browses, filters, sorts, paginates, edits and deletes
//! records of every table in a static catalog. Given only a table name the
//! engine knows the column layout, joins, search template, filters, display
//! labels and input kinds, and answers the requests of server-side paged
//! grids, edit forms and foreign-key autocomplete selects.
//!
//! ## Features
//!
//! - **Listings**: server-side paging protocol (`iDisplayStart`, `sEcho`, ...)
//!   with join-aware counting, free-text search and `filter-<key>` filters
//! - **Edit forms**: 15 input kinds rendered to a UI tree and HTML, and parsed
//!   back from posted `field-<column>` values
//! - **Foreign-key autocomplete**: paged label search and preselection by id,
//!   with per-field type scopes on shared lookup tables
//! - **Mutations**: insert, update and delete with existence checks
//! - **SQL Injection Prevention**: every value is bound; identifiers come from
//!   the validated catalog
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridcrud::{EngineConfig, FormParams, GridEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::builder("sqlite://media.db").build();
//!     let engine = GridEngine::new(config).await?;
//!     engine.ensure_tables().await?;
//!
//!     // Second page of missing movies, newest title first
//!     let params: FormParams = [
//!         ("iDisplayStart", "10"),
//!         ("iDisplayLength", "10"),
//!         ("iSortCol_0", "1"),
//!         ("sSortDir_0", "desc"),
//!         ("sEcho", "2"),
//!         ("filter-missing", "1"),
//!     ]
//!     .into_iter()
//!     .collect();
//!     let page = engine.listing_endpoint("movies", &params).await;
//!     println!("{}", serde_json::to_string(&page)?);
//!
//!     // Options for the dbmovie_id select of the movies form
//!     let search: FormParams = [("search", "incep")].into_iter().collect();
//!     let options = engine
//!         .autocomplete_endpoint("movies", "dbmovie_id", &search)
//!         .await;
//!     println!("{} options, more: {}", options.results.len(), options.pagination.more);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use std::time::Duration;
//! use gridcrud::EngineConfig;
//!
//! let config = EngineConfig::builder("sqlite://media.db")
//!     .max_page_length(100)                // Ceiling for iDisplayLength
//!     .default_page_length(10)             // Used for missing/garbage lengths
//!     .autocomplete_page_size(20)          // Options per autocomplete page
//!     .query_timeout(Duration::from_secs(30))
//!     .csrf_field("csrf_token")            // Stripped from posted records
//!     .build();
//! ```

pub mod autocomplete;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod fields;
pub mod payload;
pub mod protocol;
pub mod sql;
pub mod types;

// Re-export main types for convenience
pub use autocomplete::{AutocompleteItem, AutocompletePage, ReferenceRelation};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use descriptor::{ColumnDescriptor, TableDescriptor, resolve};
pub use endpoints::EditFormResponse;
pub use engine::{EditForm, GridEngine, ListingPage};
pub use error::{GridError, Result};
pub use fields::{FieldDefinition, FieldKind, FieldValue, NumericType, ScalarKind, UiNode};
pub use payload::RecordPayload;
pub use protocol::{
    AutocompleteResponse, FormParams, ListingRequest, ListingResponse, MutationResponse,
    SortDirection,
};
pub use types::{SqlType, SqlValue};

// Re-export SQL utilities for advanced users
pub use sql::ddl::DdlGenerator;
pub use sql::sanitize::{quote_identifier, validate_identifier};
