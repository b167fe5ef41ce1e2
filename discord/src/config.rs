//! Discord application configuration.
//!
//! Credentials and endpoints are held in an explicitly constructed
//! [`DiscordConfig`] and handed to the client; nothing is read from the
//! environment after startup.

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_AUTHORIZE_URL, DEFAULT_PLATFORM_NAME, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::{LinkedRoleError, Result};
use std::env;
use std::time::Duration;

/// Discord application credentials and endpoints.
#[derive(Clone)]
pub struct DiscordConfig {
    /// OAuth2 client id (also the application id).
    pub client_id: String,

    /// OAuth2 client secret (keep confidential).
    pub client_secret: String,

    /// Redirect URI registered in the developer portal.
    pub redirect_uri: String,

    /// Versioned REST API base, without trailing slash.
    ///
    /// Default: `https://discord.com/api/v10`
    pub api_base: String,

    /// OAuth2 consent page.
    ///
    /// Default: `https://discord.com/api/oauth2/authorize`
    pub authorize_url: String,

    /// Platform name pushed with every role connection.
    ///
    /// Default: `MIYABI`
    pub platform_name: String,

    /// Per-call timeout for Discord requests.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl DiscordConfig {
    /// Create a configuration for the public Discord API.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            api_base: DEFAULT_API_BASE.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            platform_name: DEFAULT_PLATFORM_NAME.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `DISCORD_CLIENT_ID`, `DISCORD_CLIENT_SECRET`,
    /// `DISCORD_REDIRECT_URI`. Optional: `DISCORD_API_BASE`,
    /// `DISCORD_AUTHORIZE_URL`, `PLATFORM_NAME`, `DISCORD_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if a required variable is
    /// missing or empty.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_var("DISCORD_CLIENT_ID")?,
            required_var("DISCORD_CLIENT_SECRET")?,
            required_var("DISCORD_REDIRECT_URI")?,
        );

        if let Ok(api_base) = env::var("DISCORD_API_BASE") {
            config = config.with_api_base(api_base);
        }
        if let Ok(authorize_url) = env::var("DISCORD_AUTHORIZE_URL") {
            config = config.with_authorize_url(authorize_url);
        }
        if let Ok(platform_name) = env::var("PLATFORM_NAME") {
            config = config.with_platform_name(platform_name);
        }
        let timeout = env::var("DISCORD_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Ok(config.with_request_timeout(Duration::from_secs(timeout)))
    }

    /// Point the client at another API base (e.g. a mock server).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the consent page URL.
    #[must_use]
    pub fn with_authorize_url(mut self, authorize_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self
    }

    /// Set the platform name shown on role connections.
    #[must_use]
    pub fn with_platform_name(mut self, platform_name: impl Into<String>) -> Self {
        self.platform_name = platform_name.into();
        self
    }

    /// Set the per-call request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `POST` target for both grant types.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.api_base)
    }

    /// Current authorization endpoint.
    #[must_use]
    pub fn identity_url(&self) -> String {
        format!("{}/oauth2/@me", self.api_base)
    }

    /// Per-user role-connection endpoint for this application.
    #[must_use]
    pub fn role_connection_url(&self) -> String {
        format!(
            "{}/users/@me/applications/{}/role-connection",
            self.api_base, self.client_id
        )
    }

    /// Application metadata schema endpoint.
    #[must_use]
    pub fn schema_url(&self) -> String {
        format!(
            "{}/applications/{}/role-connections/metadata",
            self.api_base, self.client_id
        )
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base", &self.api_base)
            .field("authorize_url", &self.authorize_url)
            .field("platform_name", &self.platform_name)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Read a required, non-empty environment variable.
///
/// # Errors
///
/// Returns [`LinkedRoleError::Configuration`] naming the variable.
pub fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(LinkedRoleError::Configuration(format!(
            "{name} must be set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiscordConfig {
        DiscordConfig::new(
            "1234".to_string(),
            "secret".to_string(),
            "http://localhost:3000/discord-oauth-callback".to_string(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.api_base, "https://discord.com/api/v10");
        assert_eq!(config.authorize_url, "https://discord.com/api/oauth2/authorize");
        assert_eq!(config.platform_name, "MIYABI");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_endpoint_urls() {
        let config = config();
        assert_eq!(config.token_url(), "https://discord.com/api/v10/oauth2/token");
        assert_eq!(config.identity_url(), "https://discord.com/api/v10/oauth2/@me");
        assert_eq!(
            config.role_connection_url(),
            "https://discord.com/api/v10/users/@me/applications/1234/role-connection"
        );
        assert_eq!(
            config.schema_url(),
            "https://discord.com/api/v10/applications/1234/role-connections/metadata"
        );
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let config = config().with_api_base("http://127.0.0.1:9999/");
        assert_eq!(config.token_url(), "http://127.0.0.1:9999/oauth2/token");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_required_var_missing() {
        let result = required_var("LINKED_ROLES_TEST_DEFINITELY_UNSET");
        assert!(matches!(result, Err(LinkedRoleError::Configuration(_))));
    }
}
