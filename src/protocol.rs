//! Request parameters and response envelopes
//!
//! Framework-agnostic shapes of the listing, autocomplete and mutation
//! endpoints. Requests arrive as an ordered multimap of form/query
//! parameters; responses serialize to the JSON the client widgets expect.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Prefix of posted record fields
pub const FIELD_PREFIX: &str = "field-";

// ============================================================================
// Parameters
// ============================================================================

/// Ordered multimap of request parameters
///
/// Keeps every value of a repeated key in submission order, as browsers post
/// repeatable rows and multi-selects under one name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Builder-style [`FormParams::push`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// First value posted under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value posted under `name`, in order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Distinct keys in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        keys
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

/// Sort direction of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case selects descending; anything else is ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parsed listing request with safe defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub offset: i64,
    pub limit: i64,
    pub sort_column: usize,
    pub sort_direction: SortDirection,
    pub search: String,
    pub echo: i64,
    /// Full parameter set; `filter-*` keys are read from here
    pub params: FormParams,
}

impl ListingRequest {
    /// Parse the server-side paging parameters
    ///
    /// Malformed or negative values fall back to offset 0, column 0 and
    /// ascending order. A missing or non-positive page length uses the
    /// configured default; every length is capped at the configured maximum.
    pub fn from_params(params: &FormParams, config: &EngineConfig) -> Self {
        let number = |name: &str| params.get(name).and_then(|v| v.trim().parse::<i64>().ok());

        let offset = number("iDisplayStart").filter(|v| *v >= 0).unwrap_or(0);
        let limit = match number("iDisplayLength") {
            Some(v) if v > 0 => v.min(config.max_page_length),
            // -1 asks for everything
            Some(-1) => config.max_page_length,
            _ => config.default_page_length,
        };
        let sort_column = params
            .get("iSortCol_0")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        Self {
            offset,
            limit,
            sort_column,
            sort_direction: SortDirection::parse(params.get("sSortDir_0").unwrap_or("")),
            search: params.get("sSearch").unwrap_or("").trim().to_string(),
            echo: number("sEcho").unwrap_or(0),
            params: params.clone(),
        }
    }
}

/// Listing response in the server-side paging format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(rename = "sEcho")]
    pub echo: i64,
    #[serde(rename = "iTotalRecords")]
    pub total_records: i64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: i64,
    #[serde(rename = "aaData")]
    pub data: Vec<Vec<String>>,
    /// Storage failure detail; absent on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ListingResponse {
    pub fn empty(echo: i64) -> Self {
        Self {
            echo,
            total_records: 0,
            total_display_records: 0,
            data: Vec::new(),
            error: None,
        }
    }
}

// ============================================================================
// Autocomplete
// ============================================================================

/// Parsed autocomplete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteRequest {
    /// Paged substring search; `page` is 1-based
    Search { query: String, page: i64 },
    /// Exact preselection lookup by id
    Lookup { id: String },
}

impl AutocompleteRequest {
    /// A present `id` wins over `search` and `page`
    pub fn from_params(params: &FormParams) -> Self {
        if let Some(id) = params.get("id") {
            return AutocompleteRequest::Lookup {
                id: id.trim().to_string(),
            };
        }
        let page = params
            .get("page")
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        AutocompleteRequest::Search {
            query: params.get("search").unwrap_or("").trim().to_string(),
            page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResult {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub more: bool,
}

/// Autocomplete response consumed by async select widgets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub results: Vec<AutocompleteResult>,
    pub pagination: Pagination,
}

// ============================================================================
// Mutations
// ============================================================================

/// Result envelope of insert, update and delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Id of the inserted row
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            id: None,
        }
    }

    pub fn created(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::ok()
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::builder("sqlite::memory:")
            .max_page_length(100)
            .default_page_length(10)
            .build()
    }

    fn params(pairs: &[(&str, &str)]) -> FormParams {
        pairs.iter().copied().collect()
    }

    // =========================================================================
    // FormParams
    // =========================================================================

    #[test]
    fn test_params_keep_repeated_values_in_order() {
        let p = params(&[("field-a", "1"), ("x", "y"), ("field-a", "2")]);
        assert_eq!(p.get("field-a"), Some("1"));
        assert_eq!(p.get_all("field-a"), vec!["1", "2"]);
        assert_eq!(p.keys(), vec!["field-a", "x"]);
        assert!(p.contains("x"));
        assert!(!p.contains("z"));
        assert_eq!(p.len(), 3);
    }

    // =========================================================================
    // Listing request parsing
    // =========================================================================

    #[test]
    fn test_listing_defaults() {
        let req = ListingRequest::from_params(&FormParams::new(), &config());
        assert_eq!(req.offset, 0);
        assert_eq!(req.limit, 10);
        assert_eq!(req.sort_column, 0);
        assert_eq!(req.sort_direction, SortDirection::Asc);
        assert_eq!(req.search, "");
        assert_eq!(req.echo, 0);
    }

    #[test]
    fn test_listing_malformed_values_fall_back() {
        let req = ListingRequest::from_params(
            &params(&[
                ("iDisplayStart", "-5"),
                ("iDisplayLength", "abc"),
                ("iSortCol_0", "x"),
                ("sSortDir_0", "sideways"),
                ("sEcho", "<script>"),
            ]),
            &config(),
        );
        assert_eq!(req.offset, 0);
        assert_eq!(req.limit, 10);
        assert_eq!(req.sort_column, 0);
        assert_eq!(req.sort_direction, SortDirection::Asc);
        assert_eq!(req.echo, 0);
    }

    #[test]
    fn test_listing_length_capped() {
        let req =
            ListingRequest::from_params(&params(&[("iDisplayLength", "5000")]), &config());
        assert_eq!(req.limit, 100);
        let all = ListingRequest::from_params(&params(&[("iDisplayLength", "-1")]), &config());
        assert_eq!(all.limit, 100);
    }

    #[test]
    fn test_listing_values_parsed() {
        let req = ListingRequest::from_params(
            &params(&[
                ("iDisplayStart", "20"),
                ("iDisplayLength", "25"),
                ("iSortCol_0", "3"),
                ("sSortDir_0", "DESC"),
                ("sSearch", " incep "),
                ("sEcho", "7"),
            ]),
            &config(),
        );
        assert_eq!(req.offset, 20);
        assert_eq!(req.limit, 25);
        assert_eq!(req.sort_column, 3);
        assert_eq!(req.sort_direction, SortDirection::Desc);
        assert_eq!(req.search, "incep");
        assert_eq!(req.echo, 7);
    }

    #[test]
    fn test_listing_response_wire_names() {
        let resp = ListingResponse {
            echo: 3,
            total_records: 2,
            total_display_records: 1,
            data: vec![vec!["1".into(), "".into()]],
            error: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["sEcho"], 3);
        assert_eq!(json["iTotalRecords"], 2);
        assert_eq!(json["iTotalDisplayRecords"], 1);
        assert_eq!(json["aaData"][0][1], "");
        assert!(json.get("error").is_none());
    }

    // =========================================================================
    // Autocomplete
    // =========================================================================

    #[test]
    fn test_autocomplete_id_wins() {
        let req = AutocompleteRequest::from_params(&params(&[
            ("search", "x"),
            ("page", "3"),
            ("id", "9"),
        ]));
        assert_eq!(req, AutocompleteRequest::Lookup { id: "9".into() });
    }

    #[test]
    fn test_autocomplete_page_defaults() {
        let req = AutocompleteRequest::from_params(&params(&[("page", "0")]));
        assert_eq!(
            req,
            AutocompleteRequest::Search {
                query: String::new(),
                page: 1
            }
        );
    }

    #[test]
    fn test_autocomplete_response_shape() {
        let resp = AutocompleteResponse {
            results: vec![AutocompleteResult {
                id: 1,
                text: "Inception (2010)".into(),
            }],
            pagination: Pagination { more: true },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["results"][0]["text"], "Inception (2010)");
        assert_eq!(json["pagination"]["more"], true);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    #[test]
    fn test_mutation_envelopes() {
        let ok = serde_json::to_value(MutationResponse::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true}));
        let failed = serde_json::to_value(MutationResponse::failed("record not found")).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"success": false, "error": "record not found"})
        );
        assert_eq!(MutationResponse::created(4).id, Some(4));
    }
}
