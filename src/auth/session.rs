//! Lazy token acquisition for the HaloPSA API.
//!
//! A [`Session`] starts unauthenticated. The first call to
//! [`connect`](Session::connect) (or [`credentials`](Session::credentials))
//! exchanges the client credentials for a bearer token; later calls reuse it
//! until its expiry passes, then exchange again. Nothing runs in the
//! background.
//!
//! # Security
//!
//! The client secret and access tokens are never logged.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::credentials::{AuthParams, CredentialStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::HaloError;
use crate::params::Params;

/// Header name under which [`Session::credentials`] returns the token.
pub const AUTHORIZATION: &str = "Authorization";

/// Successful token endpoint body.
#[derive(Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
    expires_in: u64,
}

/// Authentication state for one HaloPSA client.
///
/// The credential store sits behind an async mutex that is held for the
/// whole check-expiry, request, store sequence, so concurrent callers
/// trigger at most one token request per expiry.
pub struct Session {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Full URL of the token endpoint.
    auth_url: String,

    /// Headers sent with the token request.
    auth_headers: Params,

    /// Kept outside the lock for error sanitization.
    /// SECURITY: Never log this value!
    client_secret: String,

    store: Mutex<CredentialStore>,

    clock: Arc<dyn Clock>,
}

impl Session {
    /// Creates an unauthenticated session using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Config` if the configuration is incomplete and
    /// `HaloError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, HaloError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an unauthenticated session reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, HaloError> {
        let http = Client::builder().build().map_err(HaloError::HttpClient)?;
        Self::from_parts(config, http, clock)
    }

    /// Creates a session sharing an existing HTTP client.
    pub(crate) fn from_parts(
        config: &Config,
        http: Client,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, HaloError> {
        let config = config.clone().validate()?;
        let params = AuthParams::from_config(&config);

        Ok(Self {
            http,
            auth_url: config.auth_url(),
            auth_headers: Params::with_defaults([("Content-Type", config.content_type.as_str())]),
            client_secret: config.client_secret.clone(),
            store: Mutex::new(CredentialStore::new(params)),
            clock,
        })
    }

    /// Ensures a usable token is held, authenticating if necessary.
    ///
    /// A no-op while the current token is valid.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`authenticate`](Self::authenticate).
    /// The stored token is left untouched on failure.
    pub async fn connect(&self) -> Result<(), HaloError> {
        let mut store = self.store.lock().await;
        if store.is_usable(self.clock.now()) {
            tracing::trace!("Reusing HaloPSA access token");
            return Ok(());
        }
        self.exchange(&mut store).await
    }

    /// Requests a new token unconditionally.
    ///
    /// # Errors
    ///
    /// - `HaloError::AuthenticationFailed` for any status other than 200
    /// - `HaloError::MalformedAuthResponse` for a 200 without a usable token
    /// - `HaloError::Http` if the request could not be sent
    pub async fn authenticate(&self) -> Result<(), HaloError> {
        let mut store = self.store.lock().await;
        self.exchange(&mut store).await
    }

    /// Connects, then returns `{"Authorization": "<type> <token>"}`.
    ///
    /// This is the only call the resource layer needs before sending a
    /// request.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`connect`](Self::connect).
    pub async fn credentials(&self) -> Result<Params, HaloError> {
        let mut store = self.store.lock().await;
        if !store.is_usable(self.clock.now()) {
            self.exchange(&mut store).await?;
        }
        Ok(Params::new().with(AUTHORIZATION, store.authorization_header()))
    }

    /// Current `Authorization` value, without connecting.
    pub async fn authorization_header(&self) -> String {
        self.store.lock().await.authorization_header()
    }

    /// True if a token is held and has not expired.
    pub async fn is_authenticated(&self) -> bool {
        self.store.lock().await.is_usable(self.clock.now())
    }

    /// Expiry of the current token.
    pub async fn expires_at(&self) -> DateTime<Utc> {
        self.store.lock().await.expires_at()
    }

    /// Full URL of the token endpoint.
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Current time according to this session's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns the client secret for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn secret_for_sanitization(&self) -> &str {
        &self.client_secret
    }

    /// Performs the token request and stores the result.
    ///
    /// Expiry is measured from the moment before the request was sent.
    async fn exchange(&self, store: &mut CredentialStore) -> Result<(), HaloError> {
        let body = encode_form(&store.auth_params().to_form());
        let started = self.clock.now();

        tracing::debug!(
            url = %self.auth_url,
            tenant = %store.auth_params().tenant,
            "Requesting HaloPSA access token"
        );

        let mut req = self.http.post(&self.auth_url);
        for (name, value) in self.auth_headers.iter() {
            req = req.header(name, value);
        }

        let response = req.body(body).send().await.map_err(|e| {
            tracing::warn!(
                error = %HaloError::sanitize_message(&e.to_string(), &self.client_secret),
                "Token request could not be sent"
            );
            HaloError::Http(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "HaloPSA rejected the token request");
            return Err(HaloError::authentication_failed(status));
        }

        let text = response.text().await.map_err(HaloError::Http)?;
        let (token_type, access_token, expires_at) = parse_token(&text, started)?;

        store.build(token_type, access_token, expires_at);
        tracing::info!(expires_at = %expires_at, "Authenticated with HaloPSA");

        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

/// Validates a token response body; nothing is stored unless every field is usable.
fn parse_token(
    body: &str,
    started: DateTime<Utc>,
) -> Result<(String, String, DateTime<Utc>), HaloError> {
    let token: TokenResponse = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Unusable HaloPSA token response");
        HaloError::malformed(e.to_string())
    })?;

    if token.token_type.trim().is_empty() {
        return Err(HaloError::malformed("token_type is empty"));
    }
    if token.access_token.is_empty() {
        return Err(HaloError::malformed("access_token is empty"));
    }

    if token.expires_in == 0 {
        return Err(HaloError::malformed("expires_in must be positive"));
    }

    let lifetime = i64::try_from(token.expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| HaloError::malformed("expires_in is out of range"))?;
    let expires_at = started
        .checked_add_signed(lifetime)
        .ok_or_else(|| HaloError::malformed("expires_in is out of range"))?;

    Ok((token.token_type, token.access_token, expires_at))
}

/// `application/x-www-form-urlencoded` body for `form`.
fn encode_form(form: &Params) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
