//! Configuration for GridEngine
//!
//! Provides a builder pattern for configuring the engine.

use std::time::Duration;

/// Configuration for the grid engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// SQLite database URL
    pub database_url: String,
    /// Hard ceiling for `iDisplayLength`, whatever the client asks for
    pub max_page_length: i64,
    /// Page length used when the client sends none or garbage
    pub default_page_length: i64,
    /// Number of options per foreign-key autocomplete page
    pub autocomplete_page_size: i64,
    /// Upper bound for every single storage call
    pub query_timeout: Duration,
    /// Name of the posted CSRF token field (stripped before building SQL)
    pub csrf_field: String,
    /// Help texts up to this many characters render inline
    pub help_inline_limit: usize,
    /// URL of the autocomplete endpoint; `{table}` and `{field}` are substituted
    pub autocomplete_path: String,
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> EngineConfigBuilder {
        EngineConfigBuilder::new(database_url)
    }
}

/// Builder for EngineConfig
#[derive(Debug)]
pub struct EngineConfigBuilder {
    database_url: String,
    max_page_length: i64,
    default_page_length: i64,
    autocomplete_page_size: i64,
    query_timeout: Duration,
    csrf_field: String,
    help_inline_limit: usize,
    autocomplete_path: String,
}

impl EngineConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_page_length: 100,
            default_page_length: 10,
            autocomplete_page_size: 20,
            query_timeout: Duration::from_secs(30),
            csrf_field: "csrf_token".to_string(),
            help_inline_limit: 80,
            autocomplete_path: "/api/autocomplete/{table}/{field}".to_string(),
        }
    }

    /// Set the page length ceiling (default: 100)
    pub fn max_page_length(mut self, limit: i64) -> Self {
        self.max_page_length = limit.max(1);
        self
    }

    /// Set the fallback page length (default: 10)
    pub fn default_page_length(mut self, limit: i64) -> Self {
        self.default_page_length = limit.max(1);
        self
    }

    /// Set the autocomplete page size (default: 20)
    pub fn autocomplete_page_size(mut self, size: i64) -> Self {
        self.autocomplete_page_size = size.max(1);
        self
    }

    /// Set the per-query timeout (default: 30s)
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the CSRF field name (default: "csrf_token")
    pub fn csrf_field(mut self, name: impl Into<String>) -> Self {
        self.csrf_field = name.into();
        self
    }

    /// Set the inline help text limit (default: 80)
    pub fn help_inline_limit(mut self, chars: usize) -> Self {
        self.help_inline_limit = chars;
        self
    }

    /// Set the autocomplete URL pattern (default: "/api/autocomplete/{table}/{field}")
    pub fn autocomplete_path(mut self, pattern: impl Into<String>) -> Self {
        self.autocomplete_path = pattern.into();
        self
    }

    /// Build the configuration
    ///
    /// The default page length never exceeds the ceiling.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            database_url: self.database_url,
            max_page_length: self.max_page_length,
            default_page_length: self.default_page_length.min(self.max_page_length),
            autocomplete_page_size: self.autocomplete_page_size,
            query_timeout: self.query_timeout,
            csrf_field: self.csrf_field,
            help_inline_limit: self.help_inline_limit,
            autocomplete_path: self.autocomplete_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = EngineConfig::builder("sqlite::memory:").build();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_page_length, 100);
        assert_eq!(config.default_page_length, 10);
        assert_eq!(config.autocomplete_page_size, 20);
        assert_eq!(config.query_timeout, Duration::from_secs(30));
        assert_eq!(config.csrf_field, "csrf_token");
        assert_eq!(config.help_inline_limit, 80);
        assert_eq!(config.autocomplete_path, "/api/autocomplete/{table}/{field}");
    }

    #[test]
    fn test_builder_accepts_string() {
        let config = EngineConfig::builder(String::from("sqlite://media.db")).build();
        assert_eq!(config.database_url, "sqlite://media.db");
    }

    // =========================================================================
    // Paging limits
    // =========================================================================

    #[test]
    fn test_custom_page_limits() {
        let config = EngineConfig::builder("sqlite::memory:")
            .max_page_length(50)
            .default_page_length(25)
            .build();

        assert_eq!(config.max_page_length, 50);
        assert_eq!(config.default_page_length, 25);
    }

    #[test]
    fn test_default_page_length_clamped_to_ceiling() {
        let config = EngineConfig::builder("sqlite::memory:")
            .max_page_length(20)
            .default_page_length(500)
            .build();

        assert_eq!(config.default_page_length, 20);
    }

    #[test]
    fn test_non_positive_limits_become_one() {
        let config = EngineConfig::builder("sqlite::memory:")
            .max_page_length(0)
            .autocomplete_page_size(-3)
            .build();

        assert_eq!(config.max_page_length, 1);
        assert_eq!(config.autocomplete_page_size, 1);
        assert_eq!(config.default_page_length, 1);
    }

    // =========================================================================
    // Misc settings
    // =========================================================================

    #[test]
    fn test_full_custom_config() {
        let config = EngineConfig::builder("sqlite::memory:")
            .query_timeout(Duration::from_millis(250))
            .csrf_field("gorilla.csrf.Token")
            .help_inline_limit(10)
            .autocomplete_path("/fk/{table}/{field}.json")
            .build();

        assert_eq!(config.query_timeout, Duration::from_millis(250));
        assert_eq!(config.csrf_field, "gorilla.csrf.Token");
        assert_eq!(config.help_inline_limit, 10);
        assert_eq!(config.autocomplete_path, "/fk/{table}/{field}.json");
    }

    #[test]
    fn test_config_debug() {
        let config = EngineConfig::builder("sqlite::memory:").build();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("EngineConfig"));
        assert!(debug_str.contains("max_page_length"));
    }
}
