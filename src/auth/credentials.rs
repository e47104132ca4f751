//! Token state and the parameters needed to obtain a new token.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::params::Params;

/// Form body of the client-credentials token request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthParams {
    /// OAuth2 grant type.
    pub grant_type: String,
    /// HaloPSA tenant name.
    pub tenant: String,
    /// Integration client ID.
    pub client_id: String,
    /// Integration client secret.
    pub client_secret: String,
    /// Requested scope.
    pub scope: String,
}

impl AuthParams {
    /// Extracts the token request fields from a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            grant_type: config.grant_type.clone(),
            tenant: config.tenant.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        }
    }

    /// Form-encoded body fields.
    pub fn to_form(&self) -> Params {
        Params::with_defaults([
            ("grant_type", self.grant_type.as_str()),
            ("tenant", self.tenant.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ])
    }
}

impl fmt::Debug for AuthParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthParams")
            .field("grant_type", &self.grant_type)
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Expiry of a store that has never authenticated.
///
/// The earliest representable instant, so every clock reads it as expired.
pub fn never_expires_at() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// Current bearer token and its expiry.
///
/// Only [`build`](Self::build) changes the token fields, and it changes all
/// three at once.
#[derive(Clone)]
pub struct CredentialStore {
    params: AuthParams,
    token_type: String,
    access_token: String,
    expires_at: DateTime<Utc>,
    logged_in: bool,
}

impl CredentialStore {
    /// Creates an unauthenticated store.
    pub fn new(params: AuthParams) -> Self {
        Self {
            params,
            token_type: String::new(),
            access_token: String::new(),
            expires_at: never_expires_at(),
            logged_in: false,
        }
    }

    /// Replaces the token triple.
    pub fn build(
        &mut self,
        token_type: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) {
        let token_type = token_type.into();
        let access_token = access_token.into();
        self.logged_in = !access_token.is_empty();
        self.token_type = token_type;
        self.access_token = access_token;
        self.expires_at = expires_at;
    }

    /// `"<token_type> <access_token>"`.
    ///
    /// Before the first `build()` this is a single space, which is not a
    /// usable credential.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// True when `now` is at or past the stored expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// True when a token exists and has not expired at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.logged_in && !self.is_expired(now)
    }

    /// Whether the last `build()` installed a token.
    ///
    /// This flag does not decay; pair it with [`is_expired`](Self::is_expired).
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Expiry instant of the current token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Token type of the current token (empty before authentication).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Parameters for the next token request.
    pub fn auth_params(&self) -> &AuthParams {
        &self.params
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("params", &self.params)
            .field("token_type", &self.token_type)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("logged_in", &self.logged_in)
            .finish()
    }
}
