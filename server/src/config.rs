//! Configuration management for the linked-roles server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Call `dotenvy::dotenv()` first to pick up a local `.env` file.

use linked_roles_discord::config::required_var;
use linked_roles_discord::stores::TokenCipher;
use linked_roles_discord::{DiscordConfig, LinkedRoleError, Result};
use linked_roles_web::state::MIN_COOKIE_SECRET_LEN;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord application credentials and endpoints
    pub discord: DiscordConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Redis token store configuration
    pub redis: RedisConfig,
    /// `PostgreSQL` profile source configuration
    pub postgres: PostgresConfig,
    /// Secret the OAuth state cookie is signed with
    pub cookie_secret: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Prometheus exporter port (exporter disabled when unset)
    pub metrics_port: Option<u16>,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
}

/// Redis configuration
#[derive(Clone)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Cipher sealing token records at rest
    pub cipher: TokenCipher,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            metrics_port: None,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Load from `HOST`, `PORT`, `METRICS_PORT` and `SHUTDOWN_TIMEOUT`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            metrics_port: env::var("METRICS_PORT").ok().and_then(|s| s.parse().ok()),
            shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
        }
    }

    /// Address the HTTP listener binds to.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if `host:port` is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.host, self.port)
    }

    /// Address of the Prometheus exporter, if enabled.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if `host:metrics_port` is
    /// not a socket address.
    pub fn metrics_addr(&self) -> Result<Option<SocketAddr>> {
        self.metrics_port
            .map(|port| parse_addr(&self.host, port))
            .transpose()
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfig")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`LinkedRoleError::Configuration`] if a required variable is
    /// missing, `COOKIE_SECRET` is shorter than 32 bytes, or
    /// `TOKEN_ENCRYPTION_KEY` is not base64 of 32 bytes.
    pub fn from_env() -> Result<Self> {
        let cookie_secret = required_var("COOKIE_SECRET")?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(LinkedRoleError::Configuration(format!(
                "COOKIE_SECRET must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            )));
        }

        Ok(Self {
            discord: DiscordConfig::from_env()?,
            server: ServerConfig::from_env(),
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                cipher: TokenCipher::from_base64(&required_var("TOKEN_ENCRYPTION_KEY")?)?,
            },
            postgres: PostgresConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            cookie_secret,
        })
    }
}

fn parse_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}").parse().map_err(|e| {
        LinkedRoleError::Configuration(format!("invalid listen address {host}:{port}: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.metrics_addr().unwrap(), None);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_metrics_addr_shares_host() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            metrics_port: Some(9090),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.metrics_addr().unwrap(),
            Some("127.0.0.1:9090".parse().unwrap())
        );
    }

    #[test]
    fn test_invalid_host_rejected() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.bind_addr(),
            Err(LinkedRoleError::Configuration(_))
        ));
    }
}
