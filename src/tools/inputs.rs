//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::resources::{ListParams, Resource};

/// Maximum records a single list_records call may request.
pub const MAX_LIST_COUNT: u32 = 500;

/// Default number of records returned by list_records.
pub const DEFAULT_LIST_COUNT: u32 = 50;

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Input parameters for the list_records tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListRecordsInput {
    /// Which resource to list: clients, agents, tickets, assets or suppliers.
    pub resource: Resource,

    /// Free-text search (e.g. part of a client name or ticket summary).
    #[serde(default)]
    pub search: Option<String>,

    /// Maximum number of records to return (default: 50, max: 500).
    #[serde(default)]
    pub count: Option<u32>,

    /// Page size; enables pagination (defaults to 50 when only page_no is set).
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Page number (1-based); uses a page size of 50 when page_size is not set.
    #[serde(default)]
    pub page_no: Option<u32>,

    /// Include inactive (or disabled) records. Defaults to true.
    #[serde(default)]
    pub include_inactive: Option<bool>,
}

impl ListRecordsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            resource: self.resource,
            search: trim_option(&self.search),
            count: self.count,
            page_size: self.page_size,
            page_no: self.page_no,
            include_inactive: self.include_inactive,
        }
    }

    /// Converts the input into list overrides, clamping the count.
    pub fn to_list_params(&self) -> ListParams {
        let count = self.count.unwrap_or(DEFAULT_LIST_COUNT).clamp(1, MAX_LIST_COUNT);
        let mut params = ListParams::new().with_count(count);

        if let Some(search) = &self.search {
            params = params.with_search(search.clone());
        }
        if self.page_size.is_some() || self.page_no.is_some() {
            let size = self
                .page_size
                .unwrap_or(DEFAULT_LIST_COUNT)
                .clamp(1, MAX_LIST_COUNT);
            params = params.with_page(size, self.page_no.unwrap_or(1).max(1));
        }
        if let Some(include) = self.include_inactive {
            params = params.with_include_inactive(include);
        }
        params
    }
}

/// Input parameters for the get_record tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetRecordInput {
    /// Which resource the record belongs to.
    pub resource: Resource,

    /// The numeric record ID (e.g. "1042").
    pub id: String,
}

impl GetRecordInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            resource: self.resource,
            id: self.id.trim().to_string(),
        }
    }
}

/// Input parameters for tools that only need a resource.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResourceInput {
    /// Which resource: clients, agents, tickets, assets or suppliers.
    pub resource: Resource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list_input() -> ListRecordsInput {
        ListRecordsInput {
            resource: Resource::Clients,
            search: None,
            count: None,
            page_size: None,
            page_no: None,
            include_inactive: None,
        }
    }

    #[test]
    fn test_list_input_deserializes_lowercase_resource() {
        let input: ListRecordsInput =
            serde_json::from_str(r#"{"resource":"tickets","search":"printer"}"#).unwrap();
        assert_eq!(input.resource, Resource::Tickets);
        assert_eq!(input.search.as_deref(), Some("printer"));
    }

    #[test]
    fn test_list_input_sanitize_drops_blank_search() {
        let input = ListRecordsInput {
            search: Some("   ".to_string()),
            ..list_input()
        }
        .sanitize();
        assert_eq!(input.search, None);
    }

    #[test]
    fn test_list_params_default_count() {
        let params = list_input().to_list_params().into_params(Resource::Clients);
        assert_eq!(params.get("count"), Some("50"));
    }

    #[test]
    fn test_list_params_count_is_clamped() {
        let input = ListRecordsInput {
            count: Some(100_000),
            ..list_input()
        };
        let params = input.to_list_params().into_params(Resource::Clients);
        assert_eq!(params.get("count"), Some("500"));
    }

    #[test]
    fn test_list_params_page_defaults_to_first() {
        let input = ListRecordsInput {
            page_size: Some(25),
            ..list_input()
        };
        let params = input.to_list_params().into_params(Resource::Clients);
        assert_eq!(params.get("pageinate"), Some("true"));
        assert_eq!(params.get("page_no"), Some("1"));
    }

    #[test]
    fn test_list_params_page_no_alone_uses_default_size() {
        let input = ListRecordsInput {
            page_no: Some(3),
            ..list_input()
        };
        let params = input.to_list_params().into_params(Resource::Clients);
        assert_eq!(params.get("pageinate"), Some("true"));
        assert_eq!(params.get("page_size"), Some("50"));
        assert_eq!(params.get("page_no"), Some("3"));
    }

    #[test]
    fn test_get_record_input_sanitize() {
        let input = GetRecordInput {
            resource: Resource::Assets,
            id: "  77 ".to_string(),
        }
        .sanitize();
        assert_eq!(input.id, "77");
    }
}
