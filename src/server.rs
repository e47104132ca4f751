//! MCP server implementation for HaloPSA.
//!
//! This module defines the `HaloServer` struct that implements the MCP
//! `ServerHandler` trait, exposing read-only HaloPSA operations as tools.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde_json::Value;

use crate::error::HaloError;
use crate::halo_client::HaloClient;
use crate::resources::{ListParams, Resource};
use crate::tools::{GetRecordInput, ListRecordsInput, ResourceInput};

/// Maximum length of a formatted record before truncation.
const MAX_RECORD_LENGTH: usize = 4000;

/// The HaloPSA MCP server.
#[derive(Clone)]
pub struct HaloServer {
    /// HaloPSA client for API operations.
    client: HaloClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HaloServer {
    /// Creates a new server instance.
    pub fn new(client: HaloClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Returns "pong"; no HaloPSA call is made.
    #[tool(description = "Test connectivity to the HaloPSA MCP server. Returns 'pong' if the server is running correctly.")]
    fn ping(&self) -> String {
        tracing::debug!("ping tool called");
        "pong".to_string()
    }

    /// Authenticates if needed and reports the token state.
    #[tool(description = "Authenticate against HaloPSA if needed and report whether the session holds a valid token and when it expires.")]
    async fn auth_status(&self) -> Result<String, String> {
        tracing::debug!("auth_status tool called");

        let session = self.client.session();
        session.connect().await.map_err(|e| {
            let sanitized = self.sanitize_error(&e);
            tracing::error!(error = %sanitized, "Failed to authenticate");
            format!("Failed to authenticate: {}", sanitized)
        })?;

        Ok(format!(
            "Authenticated: {}\nToken expires at: {}\n",
            session.is_authenticated().await,
            session.expires_at().await.to_rfc3339()
        ))
    }

    /// List records of one resource.
    #[tool(description = "List HaloPSA records of one resource (clients, agents, tickets, assets, suppliers). Supports free-text search, a count limit, pagination and excluding inactive records. Returns one line per record with its ID.")]
    async fn list_records(
        &self,
        Parameters(input): Parameters<ListRecordsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "list_records tool called");

        let resource = input.resource;
        let records = self
            .client
            .list(resource, input.to_list_params())
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, resource = %resource, "Failed to list records");
                format!("Failed to list {}: {}", resource, sanitized)
            })?;

        Ok(format_record_list(resource, &records))
    }

    /// Get one record by ID.
    #[tool(description = "Get the full details of one HaloPSA record by resource and numeric ID.")]
    async fn get_record(
        &self,
        Parameters(input): Parameters<GetRecordInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(resource = %input.resource, id = %input.id, "get_record tool called");

        let record = self
            .client
            .get(input.resource, &input.id)
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, id = %input.id, "Failed to get record");
                format!("Failed to get {} {}: {}", input.resource, input.id, sanitized)
            })?;

        Ok(format_record_details(input.resource, &record))
    }

    /// Count records of one resource.
    #[tool(description = "Count the HaloPSA records of one resource (clients, agents, tickets, assets, suppliers).")]
    async fn count_records(
        &self,
        Parameters(input): Parameters<ResourceInput>,
    ) -> Result<String, String> {
        tracing::debug!(resource = %input.resource, "count_records tool called");

        let count = self.client.count(input.resource).await.map_err(|e| {
            let sanitized = self.sanitize_error(&e);
            tracing::error!(error = %sanitized, "Failed to count records");
            format!("Failed to count {}: {}", input.resource, sanitized)
        })?;

        Ok(format!("{} {}", count, input.resource))
    }

    /// "id - label" lines for every record of one resource.
    #[tool(description = "List every record of one HaloPSA resource as compact 'ID - name' lines, useful for looking up IDs.")]
    async fn list_summaries(
        &self,
        Parameters(input): Parameters<ResourceInput>,
    ) -> Result<String, String> {
        tracing::debug!(resource = %input.resource, "list_summaries tool called");

        let lines = self
            .client
            .summaries(input.resource, ListParams::new())
            .await
            .map_err(|e| {
                let sanitized = self.sanitize_error(&e);
                tracing::error!(error = %sanitized, "Failed to list summaries");
                format!("Failed to list {}: {}", input.resource, sanitized)
            })?;

        if lines.is_empty() {
            return Ok(format!("No {} found.", input.resource));
        }
        Ok(lines.join("\n"))
    }

    fn sanitize_error(&self, error: &HaloError) -> String {
        error.sanitized_display(self.client.secret_for_sanitization())
    }
}

#[tool_handler]
impl ServerHandler for HaloServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "This server provides read-only access to HaloPSA. \
                 Use list_records to search clients, agents, tickets, assets or suppliers, \
                 get_record for the details of one record, count_records for totals, \
                 and list_summaries to look up record IDs. \
                 Start with 'ping' or 'auth_status' to verify connectivity."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Response formatting helpers
// ============================================================================

/// Truncates a string if it exceeds the maximum length.
///
/// If truncated, appends "... [truncated]" to indicate the content was cut.
fn truncate_text(text: &str, max_length: usize) -> String {
    const SUFFIX: &str = "... [truncated]";

    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(SUFFIX.len());
    let cut: String = text.chars().take(keep).collect();
    format!("{}{}", cut, SUFFIX)
}

/// Formats a list of records as one line each.
fn format_record_list(resource: Resource, records: &[Value]) -> String {
    if records.is_empty() {
        return format!("No {} found matching the criteria.", resource);
    }

    let mut output = format!("Found {} {}:\n\n", records.len(), resource);
    for record in records {
        output.push_str(&resource.summarize(record));
        if let Some(inactive) = record.get("inactive").and_then(Value::as_bool) {
            if inactive {
                output.push_str(" [INACTIVE]");
            }
        }
        output.push('\n');
    }
    output
}

/// Formats one record as pretty-printed JSON under a summary line.
fn format_record_details(resource: Resource, record: &Value) -> String {
    let body = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
    format!(
        "{}\n\n{}\n",
        resource.summarize(record),
        truncate_text(&body, MAX_RECORD_LENGTH)
    )
}
