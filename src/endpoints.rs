//! Endpoint boundary
//!
//! Framework-agnostic request handlers. Each takes the raw parameters of one
//! request and always produces its response envelope: listings and lookups
//! degrade to empty payloads, mutations report `{success: false, error}`.

use serde::Serialize;

use crate::catalog;
use crate::engine::{EditForm, GridEngine};
use crate::error::GridError;
use crate::protocol::{
    AutocompleteRequest, AutocompleteResponse, FormParams, ListingRequest, ListingResponse,
    MutationResponse,
};
use crate::sql::filter::build_filter_predicate;
use crate::sql::listing::ListingQuery;

/// Envelope of the edit-form endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditFormResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<EditForm>,
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Missing records log at debug, every other failure at warn
fn log_failure(table: &str, id: i64, action: &str, error: &GridError) {
    if error.is_not_found() {
        tracing::debug!(target: "gridcrud::mutation", table, id, action, "record not found");
    } else {
        tracing::warn!(
            target: "gridcrud::mutation",
            table,
            id,
            action,
            error = %error,
            "mutation failed"
        );
    }
}

impl GridEngine {
    /// Listing endpoint in the server-side paging format
    pub async fn listing_endpoint(&self, table: &str, params: &FormParams) -> ListingResponse {
        let request = ListingRequest::from_params(params, self.config());
        let filter = catalog::table(table)
            .map(|def| build_filter_predicate(def, &request.params))
            .unwrap_or_default();
        let query = ListingQuery::from_request(&request, filter);

        match self.list(table, &query).await {
            Ok(page) => ListingResponse {
                echo: request.echo,
                total_records: page.total,
                total_display_records: page.filtered,
                data: page.into_data(),
                error: None,
            },
            Err(e) => {
                tracing::warn!(target: "gridcrud::listing", table, error = %e, "listing failed");
                ListingResponse {
                    error: Some(e.to_string()),
                    ..ListingResponse::empty(request.echo)
                }
            }
        }
    }

    /// Autocomplete endpoint for the foreign-key `field` of `table`
    ///
    /// An `id` parameter asks for the preselected option only.
    pub async fn autocomplete_endpoint(
        &self,
        table: &str,
        field: &str,
        params: &FormParams,
    ) -> AutocompleteResponse {
        let result = match AutocompleteRequest::from_params(params) {
            AutocompleteRequest::Lookup { id } => self
                .autocomplete_lookup(table, field, &id)
                .await
                .map(|item| {
                    let page = crate::autocomplete::AutocompletePage {
                        results: item.into_iter().collect(),
                        has_more: false,
                    };
                    AutocompleteResponse::from(page)
                }),
            AutocompleteRequest::Search { query, page } => self
                .autocomplete_search(table, field, &query, page)
                .await
                .map(AutocompleteResponse::from),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(
                target: "gridcrud::autocomplete",
                table,
                field,
                error = %e,
                "autocomplete failed"
            );
            AutocompleteResponse::default()
        })
    }

    /// Insert endpoint
    pub async fn insert_endpoint(&self, table: &str, params: &FormParams) -> MutationResponse {
        match self.insert(table, params).await {
            Ok(id) => MutationResponse::created(id),
            Err(e) => {
                tracing::warn!(target: "gridcrud::mutation", table, error = %e, "insert failed");
                MutationResponse::failed(e)
            }
        }
    }

    /// Update endpoint; `id` comes from the request path
    pub async fn update_endpoint(
        &self,
        table: &str,
        id: &str,
        params: &FormParams,
    ) -> MutationResponse {
        let Some(id) = parse_id(id) else {
            return MutationResponse::failed(format!("invalid id '{}'", id));
        };
        match self.update(table, id, params).await {
            Ok(()) => MutationResponse::ok(),
            Err(e) => {
                log_failure(table, id, "update", &e);
                MutationResponse::failed(e)
            }
        }
    }

    /// Delete endpoint; `id` comes from the request path
    pub async fn delete_endpoint(&self, table: &str, id: &str) -> MutationResponse {
        let Some(id) = parse_id(id) else {
            return MutationResponse::failed(format!("invalid id '{}'", id));
        };
        match self.delete(table, id).await {
            Ok(()) => MutationResponse::ok(),
            Err(e) => {
                log_failure(table, id, "delete", &e);
                MutationResponse::failed(e)
            }
        }
    }

    /// Edit-form endpoint; no id renders a blank insert form
    pub async fn edit_form_endpoint(&self, table: &str, id: Option<&str>) -> EditFormResponse {
        let id = match id {
            Some(raw) => match parse_id(raw) {
                Some(id) => Some(id),
                None => {
                    return EditFormResponse {
                        success: false,
                        error: Some(format!("invalid id '{}'", raw)),
                        form: None,
                    };
                }
            },
            None => None,
        };

        match self.edit_form(table, id).await {
            Ok(form) => EditFormResponse {
                success: true,
                error: None,
                form: Some(form),
            },
            Err(e) => {
                tracing::warn!(target: "gridcrud::mutation", table, error = %e, "edit form failed");
                EditFormResponse {
                    success: false,
                    error: Some(e.to_string()),
                    form: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 3 "), Some(3));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-4"), None);
        assert_eq!(parse_id("abc"), None);
    }
}
