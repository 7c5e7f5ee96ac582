//! Listing statement building
//!
//! Produces the three statements of one listing request: the unconditional
//! total count, the page of rows, and (when a WHERE clause exists) the
//! filtered count sharing that clause.

use crate::descriptor::TableDescriptor;
use crate::protocol::{ListingRequest, SortDirection};
use crate::sql::filter::Predicate;
use crate::sql::sanitize::{contains_pattern, escape_like_placeholders};
use crate::types::SqlValue;

/// Normalized listing parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    /// Index into the visible columns; out of range sorts by the first
    pub sort_column: usize,
    pub sort_direction: SortDirection,
    pub search: String,
    pub filter: Predicate,
    pub offset: i64,
    pub limit: i64,
}

impl ListingQuery {
    pub fn from_request(request: &ListingRequest, filter: Predicate) -> Self {
        Self {
            sort_column: request.sort_column,
            sort_direction: request.sort_direction,
            search: request.search.clone(),
            filter,
            offset: request.offset,
            limit: request.limit,
        }
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            sort_column: 0,
            sort_direction: SortDirection::Asc,
            search: String::new(),
            filter: Predicate::default(),
            offset: 0,
            limit: 10,
        }
    }
}

/// Statements of one listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ListingStatements {
    /// `COUNT(*)` over the primary table, never joined
    pub total_sql: String,
    /// Page query; binds `where_args` then offset and limit
    pub rows_sql: String,
    /// Present only when a WHERE clause applies
    pub filtered_sql: Option<String>,
    pub where_args: Vec<SqlValue>,
    pub offset: i64,
    pub limit: i64,
}

impl ListingStatements {
    /// Arguments of `rows_sql` in bind order
    pub fn row_args(&self) -> Vec<SqlValue> {
        let mut args = self.where_args.clone();
        args.push(SqlValue::Int(self.offset));
        args.push(SqlValue::Int(self.limit));
        args
    }
}

/// ORDER BY expression of a visible column index, alias stripped
pub fn sort_expression(desc: &TableDescriptor, index: usize) -> String {
    desc.read_columns
        .get(index)
        .or_else(|| desc.read_columns.first())
        .map(|c| c.expression())
        .unwrap_or_else(|| "id".to_string())
}

/// Search clause with the wrapped search text bound to every placeholder
///
/// The search text matches literally: LIKE wildcards in it are escaped.
pub fn search_predicate(desc: &TableDescriptor, search: &str) -> Predicate {
    if search.is_empty() || !desc.has_search() {
        return Predicate::default();
    }
    let pattern = contains_pattern(search);
    Predicate::new(
        escape_like_placeholders(&desc.search_template),
        vec![SqlValue::Text(pattern); desc.search_args],
    )
}

/// Build the statements of a listing
///
/// Search arguments bind before filter arguments, then offset and limit.
/// Negative offsets start at the first row; the limit is clamped to
/// `0..=max_limit`.
pub fn build_listing(
    desc: &TableDescriptor,
    query: &ListingQuery,
    max_limit: i64,
) -> ListingStatements {
    let condition = Predicate::and([search_predicate(desc, &query.search), query.filter.clone()]);

    let order = format!(
        "{} {}",
        sort_expression(desc, query.sort_column),
        query.sort_direction.to_sql()
    );
    let total_sql = format!("SELECT COUNT(*) FROM {}", desc.count_table);

    let (rows_sql, filtered_sql) = if condition.is_empty() {
        (
            format!(
                "SELECT {} FROM {} ORDER BY {} LIMIT ?, ?",
                desc.projection(),
                desc.from,
                order
            ),
            None,
        )
    } else {
        (
            format!(
                "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ?, ?",
                desc.projection(),
                desc.from,
                condition.fragment,
                order
            ),
            Some(format!(
                "SELECT COUNT(*) FROM {} WHERE {}",
                desc.from, condition.fragment
            )),
        )
    };

    ListingStatements {
        total_sql,
        rows_sql,
        filtered_sql,
        where_args: condition.args,
        offset: query.offset.max(0),
        limit: query.limit.clamp(0, max_limit.max(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::resolve;

    // =========================================================================
    // Sorting
    // =========================================================================

    #[test]
    fn test_sort_strips_alias() {
        let desc = resolve("movies");
        // "dbmovies.title AS title"
        assert_eq!(sort_expression(&desc, 1), "dbmovies.title");
        assert_eq!(sort_expression(&desc, 0), "movies.id");
    }

    #[test]
    fn test_sort_out_of_range_uses_first_column() {
        let desc = resolve("movies");
        assert_eq!(sort_expression(&desc, 999), "movies.id");
    }

    // =========================================================================
    // Statements
    // =========================================================================

    #[test]
    fn test_plain_listing_has_no_where() {
        let desc = resolve("movies");
        let stmts = build_listing(&desc, &ListingQuery::default(), 100);
        assert_eq!(stmts.total_sql, "SELECT COUNT(*) FROM movies");
        assert!(!stmts.rows_sql.contains("WHERE"));
        assert!(stmts.rows_sql.contains("LEFT JOIN dbmovies"));
        assert!(stmts.rows_sql.ends_with("ORDER BY movies.id ASC LIMIT ?, ?"));
        assert!(stmts.filtered_sql.is_none());
        assert_eq!(stmts.row_args(), vec![SqlValue::Int(0), SqlValue::Int(10)]);
    }

    #[test]
    fn test_search_and_filter_bind_order() {
        let desc = resolve("movies");
        let query = ListingQuery {
            search: "incep".into(),
            filter: Predicate::new("movies.missing = ?", vec![SqlValue::Int(1)]),
            sort_column: 1,
            sort_direction: SortDirection::Desc,
            offset: 20,
            limit: 10,
        };
        let stmts = build_listing(&desc, &query, 100);
        assert!(stmts.rows_sql.contains(
            "WHERE (dbmovies.title LIKE ? ESCAPE '\\' OR movies.listname LIKE ? ESCAPE '\\') \
             AND (movies.missing = ?)"
        ));
        assert!(stmts.rows_sql.contains("ORDER BY dbmovies.title DESC"));
        assert_eq!(
            stmts.row_args(),
            vec![
                SqlValue::Text("%incep%".into()),
                SqlValue::Text("%incep%".into()),
                SqlValue::Int(1),
                SqlValue::Int(20),
                SqlValue::Int(10),
            ]
        );
        let filtered = stmts.filtered_sql.unwrap();
        assert!(filtered.starts_with("SELECT COUNT(*) FROM movies LEFT JOIN dbmovies"));
        assert!(!filtered.contains("LIMIT"));
    }

    #[test]
    fn test_search_arguments_follow_template() {
        let desc = resolve("movie_histories");
        let p = search_predicate(&desc, "x");
        assert_eq!(p.args.len(), 3);
        assert!(search_predicate(&desc, "").is_empty());
    }

    #[test]
    fn test_filter_only() {
        let desc = resolve("qualities");
        let query = ListingQuery {
            filter: Predicate::new("type = ?", vec![SqlValue::Int(1)]),
            ..Default::default()
        };
        let stmts = build_listing(&desc, &query, 100);
        assert_eq!(
            stmts.filtered_sql.as_deref(),
            Some("SELECT COUNT(*) FROM qualities WHERE type = ?")
        );
        assert_eq!(stmts.where_args, vec![SqlValue::Int(1)]);
    }

    // =========================================================================
    // Paging bounds
    // =========================================================================

    #[test]
    fn test_limit_clamped_to_ceiling() {
        let desc = resolve("qualities");
        let query = ListingQuery {
            limit: 1000,
            ..Default::default()
        };
        assert_eq!(build_listing(&desc, &query, 25).limit, 25);
        assert_eq!(build_listing(&desc, &query, 1000).limit, 1000);
    }

    #[test]
    fn test_negative_offset_and_limit() {
        let desc = resolve("qualities");
        let query = ListingQuery {
            offset: -5,
            limit: -1,
            ..Default::default()
        };
        let stmts = build_listing(&desc, &query, 25);
        assert_eq!(stmts.offset, 0);
        assert_eq!(stmts.limit, 0);
        assert_eq!(stmts.row_args(), vec![SqlValue::Int(0), SqlValue::Int(0)]);
    }

    #[test]
    fn test_zero_limit_kept() {
        let desc = resolve("qualities");
        let query = ListingQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(build_listing(&desc, &query, 25).limit, 0);
    }

    // =========================================================================
    // LIKE escaping
    // =========================================================================

    #[test]
    fn test_search_wildcards_match_literally() {
        let desc = resolve("dbmovies");
        let p = search_predicate(&desc, "100%_");
        assert_eq!(
            p.fragment,
            "dbmovies.title LIKE ? ESCAPE '\\' OR dbmovies.imdb_id LIKE ? ESCAPE '\\'"
        );
        assert_eq!(p.args, vec![SqlValue::Text("%100\\%\\_%".into()); 2]);
    }
}
