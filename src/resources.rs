//! HaloPSA resource endpoints and their default query parameters.
//!
//! Each [`Resource`] names the API page it lives under, the response key
//! that holds its records, and the query HaloPSA expects when listing or
//! looking up records. See <https://haloacademy.halopsa.com/apidoc/resources>.

use std::fmt;
use std::str::FromStr;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HaloError;
use crate::params::Params;

/// A HaloPSA resource that can be listed and looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Customers (`/Client`).
    Clients,
    /// Agents (`/Agent`).
    Agents,
    /// Tickets (`/Tickets`).
    Tickets,
    /// Assets (`/Asset`).
    Assets,
    /// Suppliers (`/Supplier`).
    Suppliers,
}

impl Resource {
    /// Every resource, in display order.
    pub const ALL: [Resource; 5] = [
        Resource::Clients,
        Resource::Agents,
        Resource::Tickets,
        Resource::Assets,
        Resource::Suppliers,
    ];

    /// Page name below the resource server.
    pub fn page(self) -> &'static str {
        match self {
            Resource::Clients => "Client",
            Resource::Agents => "Agent",
            Resource::Tickets => "Tickets",
            Resource::Assets => "Asset",
            Resource::Suppliers => "Supplier",
        }
    }

    /// Response key holding the record array; `None` when the endpoint
    /// answers with a bare array.
    pub fn data_key(self) -> Option<&'static str> {
        match self {
            Resource::Clients => Some("clients"),
            Resource::Agents => None,
            Resource::Tickets => Some("tickets"),
            Resource::Assets => Some("assets"),
            Resource::Suppliers => Some("suppliers"),
        }
    }

    /// Record field used as a one-line label.
    pub fn label_field(self) -> &'static str {
        match self {
            Resource::Tickets => "summary",
            Resource::Assets => "inventory_number",
            _ => "name",
        }
    }

    /// Query key that toggles inactive records, if the endpoint has one.
    pub fn inactive_key(self) -> Option<&'static str> {
        match self {
            Resource::Clients | Resource::Assets | Resource::Suppliers => Some("includeinactive"),
            Resource::Agents => Some("includedisabled"),
            Resource::Tickets => None,
        }
    }

    /// Query sent when listing records.
    ///
    /// Defaults HaloPSA treats as "unset" (search, top level, ...) are omitted.
    pub fn list_defaults(self) -> Params {
        match self {
            Resource::Clients | Resource::Suppliers => Params::with_defaults([
                ("pageinate", "false"),
                ("page_size", "0"),
                ("page_no", "0"),
                ("order", "ID"),
                ("orderdesc", "false"),
                ("count", "5000"),
                ("includeinactive", "true"),
                ("includeactive", "true"),
            ]),
            Resource::Agents => Params::with_defaults([
                ("includeenabled", "true"),
                ("includedisabled", "true"),
                ("includeunassigned", "true"),
            ]),
            Resource::Tickets => Params::with_defaults([
                ("pageinate", "false"),
                ("page_size", "0"),
                ("page_no", "0"),
                ("order", "id"),
                ("orderdesc", "true"),
                ("count", "5000"),
            ]),
            Resource::Assets => Params::with_defaults([
                ("pageinate", "false"),
                ("page_size", "0"),
                ("page_no", "0"),
                ("order", "id"),
                ("orderdesc", "true"),
                ("count", "5000"),
                ("includeinactive", "true"),
                ("includeactive", "true"),
                ("includechildren", "true"),
            ]),
        }
    }

    /// Query sent when looking up a single record.
    pub fn lookup_defaults(self) -> Params {
        match self {
            Resource::Clients => Params::with_defaults([
                ("includedetails", "true"),
                ("includeactivity", "false"),
            ]),
            Resource::Assets => Params::with_defaults([
                ("includedetails", "true"),
                ("includediagramdetails", "true"),
            ]),
            Resource::Agents | Resource::Tickets | Resource::Suppliers => {
                Params::with_defaults([("includedetails", "true")])
            }
        }
    }

    /// Pulls the record array out of a list response.
    ///
    /// Accepts a bare array, the resource's data key, or an object with a
    /// single array field next to `record_count`.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::UnexpectedResponse` if no record array is found.
    pub fn extract_records(self, response: Value) -> Result<Vec<Value>, HaloError> {
        match response {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = self.data_key().and_then(|k| map.remove(k)) {
                    return Ok(items);
                }
                map.into_iter()
                    .filter(|(k, _)| k != "record_count")
                    .find_map(|(_, v)| match v {
                        Value::Array(items) => Some(items),
                        _ => None,
                    })
                    .ok_or_else(|| HaloError::unexpected(self.page(), "no record array in response"))
            }
            _ => Err(HaloError::unexpected(self.page(), "response is not an object or array")),
        }
    }

    /// `"{id} - {label}"` for one record.
    pub fn summarize(self, record: &Value) -> String {
        let id = match record.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "?".to_string(),
        };
        let label = record
            .get(self.label_field())
            .or_else(|| record.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)");
        format!("{} - {}", id, label)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Clients => "clients",
            Resource::Agents => "agents",
            Resource::Tickets => "tickets",
            Resource::Assets => "assets",
            Resource::Suppliers => "suppliers",
        };
        f.write_str(name)
    }
}

impl FromStr for Resource {
    type Err = HaloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.to_string() == wanted || r.page().to_lowercase() == wanted)
            .ok_or_else(|| HaloError::validation(format!("unknown resource: {:?}", s)))
    }
}

/// Caller overrides for a list request.
///
/// Use the builder methods, then [`into_params`](Self::into_params) to
/// layer them over a resource's defaults.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    search: Option<String>,
    count: Option<u32>,
    page: Option<(u32, u32)>,
    include_inactive: Option<bool>,
    extra: Params,
}

impl ListParams {
    /// Creates empty overrides (the resource defaults apply as-is).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by HaloPSA's free-text search.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Caps the number of records when not paginating.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Switches to pagination and selects one page (1-based).
    pub fn with_page(mut self, page_size: u32, page_no: u32) -> Self {
        self.page = Some((page_size, page_no));
        self
    }

    /// Includes or excludes inactive (or disabled) records.
    pub fn with_include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = Some(include);
        self
    }

    /// Sets any other query parameter verbatim.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.set(key, value);
        self
    }

    /// The resource's list defaults with these overrides applied.
    pub fn into_params(self, resource: Resource) -> Params {
        let mut params = resource.list_defaults();

        if let Some(search) = self.search {
            params.set("search", search);
        }
        if let Some(count) = self.count {
            params.set("count", count.to_string());
        }
        if let Some((size, no)) = self.page {
            params.set("pageinate", "true");
            params.set("page_size", size.to_string());
            params.set("page_no", no.to_string());
        }
        if let (Some(include), Some(key)) = (self.include_inactive, resource.inactive_key()) {
            params.set(key, include.to_string());
        }
        params.merge(&self.extra);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_pages() {
        assert_eq!(Resource::Clients.page(), "Client");
        assert_eq!(Resource::Tickets.page(), "Tickets");
        assert_eq!(Resource::Agents.data_key(), None);
    }

    #[test]
    fn test_from_str_accepts_name_and_page() {
        assert_eq!("clients".parse::<Resource>().unwrap(), Resource::Clients);
        assert_eq!("Supplier".parse::<Resource>().unwrap(), Resource::Suppliers);
        assert!("invoices".parse::<Resource>().is_err());
    }

    #[test]
    fn test_list_defaults_omit_unset_values() {
        let params = Resource::Clients.list_defaults();
        assert_eq!(params.get("count"), Some("5000"));
        assert_eq!(params.get("search"), None);
        assert_eq!(params.get("toplevel_id"), None);
    }

    #[test]
    fn test_list_params_override_defaults() {
        let params = ListParams::new()
            .with_search("acme")
            .with_page(50, 2)
            .with_include_inactive(false)
            .into_params(Resource::Clients);

        assert_eq!(params.get("search"), Some("acme"));
        assert_eq!(params.get("pageinate"), Some("true"));
        assert_eq!(params.get("page_size"), Some("50"));
        assert_eq!(params.get("page_no"), Some("2"));
        assert_eq!(params.get("includeinactive"), Some("false"));
        assert_eq!(params.get("order"), Some("ID"));
    }

    #[test]
    fn test_include_inactive_maps_to_disabled_for_agents() {
        let params = ListParams::new()
            .with_include_inactive(false)
            .into_params(Resource::Agents);
        assert_eq!(params.get("includedisabled"), Some("false"));
        assert_eq!(params.get("includeinactive"), None);
    }

    #[test]
    fn test_extract_records_by_data_key() {
        let response = json!({"record_count": 2, "clients": [{"id": 1}, {"id": 2}]});
        let records = Resource::Clients.extract_records(response).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_extract_records_bare_array() {
        let response = json!([{"id": 1, "name": "Ann"}]);
        let records = Resource::Agents.extract_records(response).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_extract_records_falls_back_to_only_array() {
        let response = json!({"record_count": 1, "items": [{"id": 9}]});
        let records = Resource::Suppliers.extract_records(response).unwrap();
        assert_eq!(records, vec![json!({"id": 9})]);
    }

    #[test]
    fn test_extract_records_rejects_scalar() {
        let err = Resource::Clients.extract_records(json!("nope")).unwrap_err();
        assert!(matches!(err, HaloError::UnexpectedResponse { .. }));
    }

    #[test]
    fn test_summarize_uses_label_field() {
        let ticket = json!({"id": 1042, "summary": "Printer on fire"});
        assert_eq!(Resource::Tickets.summarize(&ticket), "1042 - Printer on fire");

        let client = json!({"id": 7, "name": "Acme Ltd"});
        assert_eq!(Resource::Clients.summarize(&client), "7 - Acme Ltd");
    }

    #[test]
    fn test_summarize_missing_label() {
        let asset = json!({"id": 3});
        assert_eq!(Resource::Assets.summarize(&asset), "3 - (unnamed)");
    }
}
