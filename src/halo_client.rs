//! HTTP client for HaloPSA resources.
//!
//! This module provides the `HaloClient` struct for making authenticated
//! GET requests against the HaloPSA resource server.
//!
//! Every request first asks the [`Session`] for credentials. If that fails
//! the request is not sent and the authentication error is returned.
//! Failed requests are reported once and never retried.
//!
//! # Security
//!
//! The client secret is never logged. Error bodies are sanitized and
//! truncated before they are returned.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::auth::Session;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::HaloError;
use crate::params::Params;
use crate::resources::{ListParams, Resource};

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the HaloPSA resource server.
///
/// Cloning is cheap; clones share one session and therefore one token.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = HaloClient::new(&config)?;
///
/// let clients = client.list(Resource::Clients, ListParams::new().with_search("acme")).await?;
/// ```
#[derive(Clone, Debug)]
pub struct HaloClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Resource server URL (e.g., `https://acme.halopsa.com/api`).
    resource_url: String,

    /// Token state shared by all clones.
    session: Arc<Session>,
}

impl HaloClient {
    /// Creates a new client from configuration.
    ///
    /// No network call is made until the first request.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Config` for incomplete configuration and
    /// `HaloError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, HaloError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new client whose session reads time from `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, HaloError> {
        let config = config.clone().validate()?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(HaloError::HttpClient)?;

        let session = Session::from_parts(&config, http.clone(), clock)?;

        Ok(Self {
            http,
            resource_url: config.resource_url(),
            session: Arc::new(session),
        })
    }

    /// The authentication session backing this client.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resource server URL.
    pub fn resource_url(&self) -> &str {
        &self.resource_url
    }

    /// Returns the client secret for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn secret_for_sanitization(&self) -> &str {
        self.session.secret_for_sanitization()
    }

    /// Validates that an ID is numeric, as HaloPSA record IDs are.
    ///
    /// This keeps malformed IDs from being interpolated into URLs.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Validation` if the ID is empty or contains non-digit characters.
    fn validate_id(id: &str) -> Result<(), HaloError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HaloError::validation(format!(
                "record id must be numeric, got: {:?}",
                id.chars().take(50).collect::<String>()
            )));
        }
        Ok(())
    }

    /// Authenticates and reports a readable error on failure.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::ConnectionTest` describing the failure.
    pub async fn test_connection(&self) -> Result<(), HaloError> {
        tracing::debug!("Testing connection to HaloPSA");

        match self.session.connect().await {
            Ok(()) => {
                tracing::info!("Connection test successful");
                Ok(())
            }
            Err(HaloError::AuthenticationFailed { status, reason }) => {
                Err(HaloError::connection_test(format!(
                    "Authentication failed ({}: {}) - verify tenant, client ID and client secret",
                    status, reason
                )))
            }
            Err(HaloError::Http(e)) => {
                let message = HaloError::sanitize_message(&e.to_string(), self.secret_for_sanitization());
                Err(HaloError::connection_test(format!(
                    "HTTP error: {} - verify HALO_BASE_URL is correct",
                    message
                )))
            }
            Err(e) => Err(HaloError::connection_test(
                e.sanitized_display(self.secret_for_sanitization()),
            )),
        }
    }

    /// Lists records of `resource`.
    ///
    /// `overrides` are layered on top of the resource's default query.
    ///
    /// # Errors
    ///
    /// Authentication errors propagate unchanged; non-2xx responses become
    /// `HaloError::HttpStatus`.
    pub async fn list(
        &self,
        resource: Resource,
        overrides: ListParams,
    ) -> Result<Vec<Value>, HaloError> {
        let query = overrides.into_params(resource);
        let response = self.get_json(resource.page(), &query).await?;
        let records = resource.extract_records(response)?;

        tracing::debug!(resource = %resource, count = records.len(), "Listed records");
        Ok(records)
    }

    /// Looks up one record by ID.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Validation` for a non-numeric ID and
    /// `HaloError::NotFound` when HaloPSA answers 404.
    pub async fn get(&self, resource: Resource, id: &str) -> Result<Value, HaloError> {
        Self::validate_id(id)?;

        let path = format!("{}/{}", resource.page(), urlencoding::encode(id));
        match self.get_json(&path, &resource.lookup_defaults()).await {
            Err(HaloError::HttpStatus { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(HaloError::not_found(resource.page(), id))
            }
            other => other,
        }
    }

    /// Number of records HaloPSA reports for `resource`.
    ///
    /// Uses `record_count` when present, otherwise counts the returned records.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn count(&self, resource: Resource) -> Result<u64, HaloError> {
        let query = resource.list_defaults();
        let response = self.get_json(resource.page(), &query).await?;

        if let Some(count) = response.get("record_count").and_then(Value::as_u64) {
            return Ok(count);
        }
        let records = resource.extract_records(response)?;
        Ok(records.len() as u64)
    }

    /// One `"{id} - {label}"` line per record.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn summaries(
        &self,
        resource: Resource,
        overrides: ListParams,
    ) -> Result<Vec<String>, HaloError> {
        let records = self.list(resource, overrides).await?;
        Ok(records.iter().map(|r| resource.summarize(r)).collect())
    }

    /// Sends an authenticated GET and parses the JSON body.
    async fn get_json(&self, path: &str, query: &Params) -> Result<Value, HaloError> {
        let credentials = self.session.credentials().await?;
        let url = format!("{}/{}", self.resource_url, path);

        tracing::debug!(path = %path, "Making HaloPSA API request");

        let mut req = self.http.get(&url).query(&query.as_pairs());
        for (name, value) in credentials.iter() {
            req = req.header(name, value);
        }

        let response = req.send().await.map_err(HaloError::Http)?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        let body = response.text().await.map_err(HaloError::Http)?;
        tracing::trace!(body = %body, "HaloPSA API response");

        serde_json::from_str(&body).map_err(HaloError::Serialization)
    }

    /// Converts a non-success response into `HaloError::HttpStatus`.
    async fn handle_http_error(&self, status: StatusCode, response: reqwest::Response) -> HaloError {
        let body = response.text().await.unwrap_or_default();
        let body = HaloError::sanitize_message(&body, self.secret_for_sanitization());
        let body = truncate_body(&body, MAX_ERROR_BODY_LEN);

        tracing::warn!(status = %status, "HaloPSA API request failed");
        HaloError::HttpStatus { status, body }
    }
}

/// Truncates on a character boundary.
fn truncate_body(body: &str, max_len: usize) -> String {
    if body.chars().count() <= max_len {
        return body.to_string();
    }
    let cut: String = body.chars().take(max_len).collect();
    format!("{}...[truncated]", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::new("https://acme.halopsa.com/", "acme", "id1", "secret1")
    }

    #[test]
    fn test_resource_url_from_config() {
        let client = HaloClient::new(&test_config()).unwrap();
        assert_eq!(client.resource_url(), "https://acme.halopsa.com/api");
        assert_eq!(client.session().auth_url(), "https://acme.halopsa.com/auth/token");
    }

    #[test]
    fn test_new_rejects_missing_tenant() {
        let config = Config::new("https://acme.halopsa.com", "", "id1", "secret1");
        assert!(matches!(HaloClient::new(&config), Err(HaloError::Config(_))));
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(HaloClient::validate_id("12345").is_ok());
    }

    #[test]
    fn test_validate_id_rejects_empty() {
        assert!(HaloClient::validate_id("").is_err());
    }

    #[test]
    fn test_validate_id_rejects_path_segments() {
        let err = HaloClient::validate_id("1/../Agent").unwrap_err();
        assert!(matches!(err, HaloError::Validation(_)));
    }

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("short", 10), "short");
    }

    #[test]
    fn test_truncate_body_multibyte() {
        let body = "æøå".repeat(300);
        let truncated = truncate_body(&body, 500);
        assert!(truncated.ends_with("...[truncated]"));
        assert_eq!(truncated.chars().count(), 500 + "...[truncated]".len());
    }

    #[tokio::test]
    async fn test_clones_share_session() {
        let client = HaloClient::new(&test_config()).unwrap();
        let clone = client.clone();
        assert!(std::ptr::eq(client.session(), clone.session()));
    }
}
