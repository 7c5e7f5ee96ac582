//! SQL utilities for the grid engine
//!
//! Provides DDL generation, identifier sanitization, filter predicates and
//! listing statement building.

pub mod ddl;
pub mod filter;
pub mod listing;
pub mod sanitize;

pub use ddl::DdlGenerator;
pub use filter::{Predicate, build_filter_predicate};
pub use listing::{ListingQuery, ListingStatements, build_listing};
pub use sanitize::{
    LIKE_ESCAPE, SQLITE_RESERVED_WORDS, contains_pattern, quote_identifier, validate_identifier,
};
