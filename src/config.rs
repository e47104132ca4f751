//! Configuration management for the HaloPSA client.
//!
//! Configuration is an explicit struct: every recognized option is a field,
//! optional ones carry HaloPSA's defaults, and unknown keys are rejected.

use std::env;
use std::fmt;

use url::Url;

use crate::error::HaloError;

/// Default authentication path, relative to the base URL.
pub const DEFAULT_AUTH_PATH: &str = "auth/token";

/// Default resource path, relative to the base URL.
pub const DEFAULT_ACTION_PATH: &str = "api";

/// Default OAuth2 grant type.
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

/// Default authentication scope.
pub const DEFAULT_SCOPE: &str = "all";

/// Default Content-Type of the authentication request.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Connection settings for one HaloPSA tenant.
///
/// The client secret is never printed: the `Debug` impl redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the HaloPSA instance (e.g. `https://acme.halopsa.com`).
    pub base_url: String,

    /// Authentication path below `base_url`.
    pub auth_path: String,

    /// Resource path below `base_url`.
    pub action_path: String,

    /// HaloPSA tenant name.
    pub tenant: String,

    /// Client ID of the HaloPSA integration application.
    pub client_id: String,

    /// Client secret of the HaloPSA integration application.
    pub client_secret: String,

    /// OAuth2 grant type.
    pub grant_type: String,

    /// Requested scope.
    pub scope: String,

    /// Content-Type header of the authentication request.
    pub content_type: String,
}

impl Config {
    /// Creates a configuration with defaults for every optional field.
    pub fn new(
        base_url: impl Into<String>,
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            action_path: DEFAULT_ACTION_PATH.to_string(),
            tenant: tenant.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Sets the authentication path.
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// Sets the resource path.
    pub fn with_action_path(mut self, path: impl Into<String>) -> Self {
        self.action_path = path.into();
        self
    }

    /// Sets the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the OAuth2 grant type.
    pub fn with_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.grant_type = grant_type.into();
        self
    }

    /// Sets the authentication Content-Type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Builds a configuration from `key = value` pairs.
    ///
    /// Recognized keys: `base_url`, `auth_path`, `action_path`, `tenant`,
    /// `client_id`, `client_secret`, `grant_type`, `scope`, `content_type`.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Config` on an unknown key or if the result fails
    /// [`validate`](Self::validate).
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, HaloError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Config::new("", "", "", "");
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "base_url" => config.base_url = value,
                "auth_path" => config.auth_path = value,
                "action_path" => config.action_path = value,
                "tenant" => config.tenant = value,
                "client_id" => config.client_id = value,
                "client_secret" => config.client_secret = value,
                "grant_type" => config.grant_type = value,
                "scope" => config.scope = value,
                "content_type" => config.content_type = value,
                other => {
                    return Err(HaloError::invalid_config(format!(
                        "unknown configuration key: {}",
                        other
                    )));
                }
            }
        }
        config.validate()
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `HALO_BASE_URL`
    /// - `HALO_TENANT`
    /// - `HALO_CLIENT_ID`
    /// - `HALO_CLIENT_SECRET`
    ///
    /// # Optional Environment Variables
    ///
    /// `HALO_AUTH_PATH`, `HALO_ACTION_PATH`, `HALO_SCOPE`, `HALO_GRANT_TYPE`
    /// and `HALO_CONTENT_TYPE` override their defaults.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Config` if any required variable is missing
    /// or if values fail validation.
    pub fn from_env() -> Result<Self, HaloError> {
        let mut config = Config::new(
            Self::get_required_env("HALO_BASE_URL")?,
            Self::get_required_env("HALO_TENANT")?,
            Self::get_required_env("HALO_CLIENT_ID")?,
            Self::get_required_env("HALO_CLIENT_SECRET")?,
        );

        if let Some(v) = Self::get_optional_env("HALO_AUTH_PATH") {
            config.auth_path = v;
        }
        if let Some(v) = Self::get_optional_env("HALO_ACTION_PATH") {
            config.action_path = v;
        }
        if let Some(v) = Self::get_optional_env("HALO_SCOPE") {
            config.scope = v;
        }
        if let Some(v) = Self::get_optional_env("HALO_GRANT_TYPE") {
            config.grant_type = v;
        }
        if let Some(v) = Self::get_optional_env("HALO_CONTENT_TYPE") {
            config.content_type = v;
        }

        config.validate()
    }

    /// Checks required fields and normalizes URLs and paths.
    ///
    /// # Errors
    ///
    /// Returns `HaloError::Config` for an empty required field, a base URL
    /// without an http(s) scheme, or a placeholder client secret.
    pub fn validate(mut self) -> Result<Self, HaloError> {
        for (name, value) in [
            ("base_url", &self.base_url),
            ("tenant", &self.tenant),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("grant_type", &self.grant_type),
            ("content_type", &self.content_type),
        ] {
            if value.trim().is_empty() {
                return Err(HaloError::invalid_config(format!("{} is required", name)));
            }
        }

        self.base_url = Self::validate_base_url(&self.base_url)?;
        self.auth_path = Self::normalize_path(&self.auth_path);
        self.action_path = Self::normalize_path(&self.action_path);
        self.tenant = self.tenant.trim().to_string();
        self.client_id = self.client_id.trim().to_string();
        Self::validate_client_secret(&self.client_secret)?;

        Ok(self)
    }

    /// Full URL of the token endpoint.
    pub fn auth_url(&self) -> String {
        Self::join(&self.base_url, &self.auth_path)
    }

    /// Full URL of the resource server.
    pub fn resource_url(&self) -> String {
        Self::join(&self.base_url, &self.action_path)
    }

    fn join(base: &str, path: &str) -> String {
        let base = base.trim_end_matches('/');
        let path = path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, HaloError> {
        env::var(name)
            .map_err(|_| HaloError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(HaloError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    fn get_optional_env(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: &str) -> Result<String, HaloError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(HaloError::invalid_config(
                "base_url must start with http:// or https://",
            ));
        }

        let parsed = Url::parse(&url)
            .map_err(|e| HaloError::invalid_config(format!("base_url is not a valid URL: {}", e)))?;
        if parsed.host_str().is_none() {
            return Err(HaloError::invalid_config("base_url has no host"));
        }

        Ok(url)
    }

    fn normalize_path(path: &str) -> String {
        path.trim().trim_matches('/').to_string()
    }

    /// Rejects secrets copied verbatim from a sample `.env`.
    fn validate_client_secret(secret: &str) -> Result<(), HaloError> {
        let lower = secret.to_lowercase();
        let placeholder_patterns = [
            "your_client_secret",
            "your_secret",
            "placeholder",
            "changeme",
        ];

        for pattern in placeholder_patterns {
            if lower.contains(pattern) {
                return Err(HaloError::invalid_config(
                    "client_secret appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("auth_path", &self.auth_path)
            .field("action_path", &self.action_path)
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("grant_type", &self.grant_type)
            .field("scope", &self.scope)
            .field("content_type", &self.content_type)
            .finish()
    }
}
