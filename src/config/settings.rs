//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every section is optional; missing values fall back to defaults that
//! match a local development setup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::legislation::DEFAULT_BASE_URL;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication settings for `POST /mcp`.
    #[serde(default)]
    pub auth: AuthConfig,

    /// CORS settings.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Upstream legislation API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "auth.api_key must not be empty".to_string(),
            });
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "upstream.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "upstream.base_url must not be empty".to_string(),
            });
        }
        if self.cors.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: "cors.allowed_origins must not contain empty entries".to_string(),
            });
        }
        Ok(())
    }

    /// Returns `true` if the API key is still the built-in placeholder.
    #[must_use]
    pub fn uses_placeholder_api_key(&self) -> bool {
        self.auth.api_key == PLACEHOLDER_API_KEY
    }
}

/// Placeholder API key used when none is configured.
pub const PLACEHOLDER_API_KEY: &str = "your-secret-api-key-here";

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to.
    /// Default: 0.0.0.0
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    /// Default: 8000
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Returns the socket address to bind.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    8000
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Bearer token expected in the `Authorization` header.
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// The only browser origin allowed to call `POST /mcp`.
    ///
    /// Requests without an `Origin` header are always allowed through the
    /// origin check. When unset, any request carrying an origin is rejected.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            allowed_origin: None,
        }
    }
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. A single `"*"` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Returns `true` if any origin is allowed.
    #[must_use]
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Upstream legislation API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL of the document service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    /// Default: 30
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional file that receives a copy of all log output.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.uses_placeholder_api_key());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "server": {
                "host": "127.0.0.1",
                "port": 9000
            },
            "auth": {
                "api_key": "s3cret",
                "allowed_origin": "https://flowise.example.com"
            },
            "cors": {
                "allowed_origins": ["https://flowise.example.com"]
            },
            "upstream": {
                "base_url": "http://localhost:8080/mevzuat",
                "timeout_secs": 10
            },
            "logging": {
                "level": "debug",
                "file": "/var/log/mevzuat-mcp.log"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.auth.api_key, "s3cret");
        assert_eq!(
            config.auth.allowed_origin.as_deref(),
            Some("https://flowise.example.com")
        );
        assert!(!config.cors.allows_any());
        assert_eq!(config.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.file,
            Some(PathBuf::from("/var/log/mevzuat-mcp.log"))
        );
    }

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn upstream_config_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn cors_config_defaults() {
        assert!(CorsConfig::default().allows_any());
    }

    #[test]
    fn reject_empty_api_key() {
        let json = r#"{"auth": {"api_key": "  "}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{"upstream": {"timeout_secs": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
