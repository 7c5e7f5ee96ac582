//! SQL identifier and expression helpers
//!
//! Identifier validation and quoting, alias stripping for projection
//! expressions, placeholder counting for search templates and LIKE pattern
//! escaping.

use std::sync::LazyLock;

use regex::Regex;

/// SQLite keywords that cannot be used as unquoted identifiers
pub const SQLITE_RESERVED_WORDS: &[&str] = &[
    "ABORT", "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "AUTOINCREMENT", "BETWEEN", "BY", "CASE",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "DEFAULT", "DEFERRABLE", "DELETE", "DESC", "DISTINCT",
    "DROP", "ELSE", "ESCAPE", "EXCEPT", "EXISTS", "FOREIGN", "FROM", "FULL", "GLOB", "GROUP",
    "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NOTNULL", "NULL", "OFFSET", "ON", "OR", "ORDER",
    "OUTER", "PRIMARY", "REFERENCES", "REGEXP", "RIGHT", "ROLLBACK", "SELECT", "SET", "TABLE",
    "THEN", "TO", "TRANSACTION", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN",
    "WHERE", "WITH",
];

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("identifier pattern compiles"));

static ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*?)\s+AS\s+([A-Za-z_][A-Za-z0-9_]*)\s*$").expect("alias pattern compiles")
});

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Example
/// ```
/// use gridcrud::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("movies"), "\"movies\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate a table or column name
///
/// Rules:
/// - Must start with a lowercase letter
/// - Can only contain lowercase letters, numbers, and underscores
/// - Cannot be a SQLite keyword
///
/// # Example
/// ```
/// use gridcrud::sql::validate_identifier;
///
/// assert!(validate_identifier("dbmovies").is_ok());
/// assert!(validate_identifier("select").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if !IDENTIFIER_RE.is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Must start with a lowercase letter and contain only lowercase letters, numbers, and underscores.",
            name
        ));
    }

    if SQLITE_RESERVED_WORDS.contains(&name.to_uppercase().as_str()) {
        return Err(format!(
            "Identifier '{}' is a SQLite keyword and cannot be used.",
            name
        ));
    }

    Ok(())
}

/// Split a projection expression into `(expression, alias)`
///
/// `dbmovies.title AS title` yields `("dbmovies.title", "title")`; a bare
/// `movies.listname` yields `("movies.listname", "listname")`.
pub fn split_alias(projection: &str) -> (String, String) {
    let projection = projection.trim();
    if let Some(caps) = ALIAS_RE.captures(projection) {
        return (caps[1].trim().to_string(), caps[2].to_string());
    }
    let alias = projection
        .rsplit('.')
        .next()
        .unwrap_or(projection)
        .trim_matches('"')
        .to_string();
    (projection.to_string(), alias)
}

/// Projection expression with any trailing `AS alias` removed
pub fn strip_alias(projection: &str) -> String {
    split_alias(projection).0
}

/// Escape clause paired with every `LIKE ?` built from user text
pub const LIKE_ESCAPE: &str = "ESCAPE '\\'";

/// Substring LIKE pattern matching `text` literally
///
/// `%`, `_` and the escape character itself lose their wildcard meaning.
///
/// # Example
/// ```
/// use gridcrud::sql::contains_pattern;
///
/// assert_eq!(contains_pattern("100%"), "%100\\%%");
/// ```
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Pair every `LIKE ?` of a search template with [`LIKE_ESCAPE`]
pub fn escape_like_placeholders(template: &str) -> String {
    template.replace("LIKE ?", &format!("LIKE ? {}", LIKE_ESCAPE))
}

/// Count positional `?` placeholders outside of string literals
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut in_single = false;
    let mut in_double = false;
    for c in sql.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '?' if !in_single && !in_double => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // quote_identifier
    // =========================================================================

    #[test]
    fn test_quote_identifier_simple() {
        assert_eq!(quote_identifier("movies"), "\"movies\"");
        assert_eq!(quote_identifier("a"), "\"a\"");
    }

    #[test]
    fn test_quote_identifier_with_quotes() {
        assert_eq!(
            quote_identifier("table\"with\"quotes"),
            "\"table\"\"with\"\"quotes\""
        );
    }

    #[test]
    fn test_quote_identifier_reserved_keyword() {
        assert_eq!(quote_identifier("select"), "\"select\"");
    }

    // =========================================================================
    // validate_identifier
    // =========================================================================

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("serie_episode_files").is_ok());
        assert!(validate_identifier("r_sshistories").is_ok());
        assert!(validate_identifier("table1").is_ok());
    }

    #[test]
    fn test_validate_identifier_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_bad_shapes() {
        assert!(validate_identifier("1movies").is_err());
        assert!(validate_identifier("_movies").is_err());
        assert!(validate_identifier("Movies").is_err());
        assert!(validate_identifier("my-table").is_err());
        assert!(validate_identifier("movies; drop table x").is_err());
        assert!(validate_identifier("db.movies").is_err());
    }

    #[test]
    fn test_validate_identifier_keywords() {
        let result = validate_identifier("select");
        assert!(result.unwrap_err().contains("keyword"));
        assert!(validate_identifier("where").is_err());
        assert!(validate_identifier("order").is_err());
    }

    #[test]
    fn test_reserved_words_contains_common_keywords() {
        assert!(SQLITE_RESERVED_WORDS.contains(&"SELECT"));
        assert!(SQLITE_RESERVED_WORDS.contains(&"LIMIT"));
        assert!(!SQLITE_RESERVED_WORDS.contains(&"TYPE"));
    }

    // =========================================================================
    // Alias handling
    // =========================================================================

    #[test]
    fn test_split_alias_with_as() {
        assert_eq!(
            split_alias("dbmovies.title AS title"),
            ("dbmovies.title".to_string(), "title".to_string())
        );
        assert_eq!(
            split_alias("dbseries.seriename as serie_name"),
            ("dbseries.seriename".to_string(), "serie_name".to_string())
        );
    }

    #[test]
    fn test_split_alias_qualified_without_as() {
        assert_eq!(
            split_alias("movies.listname"),
            ("movies.listname".to_string(), "listname".to_string())
        );
    }

    #[test]
    fn test_split_alias_bare_column() {
        assert_eq!(split_alias("year"), ("year".to_string(), "year".to_string()));
    }

    #[test]
    fn test_strip_alias_keeps_expression() {
        assert_eq!(
            strip_alias("COALESCE(a.x, b.y) AS label"),
            "COALESCE(a.x, b.y)"
        );
    }

    // =========================================================================
    // Placeholders
    // =========================================================================

    #[test]
    fn test_count_placeholders() {
        assert_eq!(count_placeholders("title LIKE ? OR imdb_id LIKE ?"), 2);
        assert_eq!(count_placeholders("x = '?' AND y = ?"), 1);
        assert_eq!(count_placeholders(""), 0);
    }

    // =========================================================================
    // LIKE patterns
    // =========================================================================

    #[test]
    fn test_contains_pattern_plain_text() {
        assert_eq!(contains_pattern("incep"), "%incep%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn test_escape_like_placeholders() {
        assert_eq!(
            escape_like_placeholders("title LIKE ? OR imdb_id LIKE ?"),
            "title LIKE ? ESCAPE '\\' OR imdb_id LIKE ? ESCAPE '\\'"
        );
        assert_eq!(escape_like_placeholders("type = ?"), "type = ?");
        assert_eq!(count_placeholders(&escape_like_placeholders("a LIKE ?")), 1);
    }
}
