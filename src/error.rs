//! Error types for the HaloPSA client.
//!
//! This module defines `HaloError`, the unified error type used throughout
//! the crate for consistent error handling and propagation.
//!
//! # Security
//!
//! Error messages must never carry the client secret or a bearer token.
//! Use `sanitize_message()` when building messages from external sources
//! such as response bodies.

use thiserror::Error;

/// Unified error type for all HaloPSA operations.
#[derive(Error, Debug)]
pub enum HaloError {
    /// Missing or invalid configuration, detected before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// The authentication endpoint answered with a non-200 status.
    #[error("authentication failed: {status}: {reason}")]
    AuthenticationFailed {
        /// HTTP status code returned by the authentication endpoint.
        status: u16,
        /// Canonical reason phrase for the status code.
        reason: String,
    },

    /// The authentication endpoint answered 200 but the body was unusable.
    #[error("malformed authentication response: {0}")]
    MalformedAuthResponse(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A resource request returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, truncated and sanitized.
        body: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A single-record lookup found nothing.
    #[error("{resource} record not found: {id}")]
    NotFound {
        /// Resource page the lookup targeted (e.g. `Client`).
        resource: String,
        /// The record ID that was requested.
        id: String,
    },

    /// A resource response did not have the expected shape.
    #[error("unexpected {resource} response: {message}")]
    UnexpectedResponse {
        /// Resource page the request targeted.
        resource: String,
        /// What was wrong with the response.
        message: String,
    },

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl HaloError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        HaloError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        HaloError::Config(message.into())
    }

    /// Creates an authentication failure from a response status.
    pub fn authentication_failed(status: reqwest::StatusCode) -> Self {
        HaloError::AuthenticationFailed {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Creates a malformed authentication response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        HaloError::MalformedAuthResponse(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        HaloError::Validation(message.into())
    }

    /// Creates a not found error for a record lookup.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        HaloError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected(resource: impl Into<String>, message: impl Into<String>) -> Self {
        HaloError::UnexpectedResponse {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        HaloError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns true if the error came out of the token exchange.
    ///
    /// Malformed responses propagate exactly like rejected credentials.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            HaloError::AuthenticationFailed { .. } | HaloError::MalformedAuthResponse(_)
        )
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            HaloError::AuthenticationFailed { status, .. } => Some(*status),
            HaloError::HttpStatus { status, .. } => Some(status.as_u16()),
            HaloError::Http(e) | HaloError::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Replaces any occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Display message with `secret` redacted.
    #[must_use]
    pub fn sanitized_display(&self, secret: &str) -> String {
        Self::sanitize_message(&self.to_string(), secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_missing_env_error() {
        let err = HaloError::missing_env("HALO_TENANT");
        assert!(err.to_string().contains("HALO_TENANT"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_authentication_failed_keeps_status_and_reason() {
        let err = HaloError::authentication_failed(StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "authentication failed: 401: Unauthorized");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_malformed_is_auth_failure() {
        let err = HaloError::malformed("missing field `expires_in`");
        assert!(err.is_auth_failure());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_config_is_not_auth_failure() {
        assert!(!HaloError::invalid_config("bad").is_auth_failure());
    }

    #[test]
    fn test_not_found_error() {
        let err = HaloError::not_found("Client", "42");
        assert_eq!(err.to_string(), "Client record not found: 42");
    }

    #[test]
    fn test_http_status_error() {
        let err = HaloError::HttpStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_sanitize_message_removes_secret() {
        let secret = "s3cr3t-value";
        let message = format!("rejected client_secret={}", secret);
        let sanitized = HaloError::sanitize_message(&message, secret);
        assert!(!sanitized.contains(secret));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        assert_eq!(HaloError::sanitize_message(message, ""), message);
    }

    #[test]
    fn test_connection_test_error() {
        let err = HaloError::connection_test("Could not reach server");
        let msg = err.to_string();
        assert!(msg.contains("connection test failed"));
        assert!(msg.contains("Could not reach server"));
    }
}
