//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk, applying
//! environment overrides and parsing it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the `CONFIG_FILE` CLI argument (must exist)
//! 2. Default location (used only if present):
//!    - **Linux/macOS:** `~/.mevzuat-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.mevzuat-mcp\config.json`
//! 3. Built-in defaults
//!
//! # Environment Overrides
//!
//! | Variable | Setting |
//! |---|---|
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `MCP_API_KEY` | `auth.api_key` |
//! | `MCP_ALLOWED_ORIGIN` | `auth.allowed_origin` |
//! | `ALLOWED_ORIGINS` | `cors.allowed_origins` (comma separated) |
//! | `API_TIMEOUT` | `upstream.timeout_secs` |
//! | `LOG_LEVEL` | `logging.level` |

mod settings;

pub use settings::{
    AuthConfig, Config, CorsConfig, LoggingConfig, ServerConfig, UpstreamConfig,
    PLACEHOLDER_API_KEY,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.mevzuat-mcp/`
/// - **Windows:** `%USERPROFILE%\.mevzuat-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".mevzuat-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration, applies environment overrides and validates it.
///
/// If `path` is `None`, the default location is used when it exists and
/// built-in defaults otherwise.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - An environment override cannot be parsed
/// - Required fields are missing or invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_config_file(&p)?,
            _ => Config::default(),
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    config.validate()?;

    Ok(config)
}

/// Reads and parses a configuration file without validating it.
fn read_config_file(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound {
            path: config_path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Empty values are treated as unset.
///
/// # Errors
///
/// Returns a validation error if a numeric or address variable cannot be parsed.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("HOST") {
        config.server.host = host.trim().parse().map_err(|_| invalid_env("HOST", &host))?;
    }
    if let Some(port) = get("PORT") {
        config.server.port = port.trim().parse().map_err(|_| invalid_env("PORT", &port))?;
    }
    if let Some(key) = get("MCP_API_KEY") {
        config.auth.api_key = key;
    }
    if let Some(origin) = get("MCP_ALLOWED_ORIGIN") {
        config.auth.allowed_origin = Some(origin.trim().to_string());
    }
    if let Some(origins) = get("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(ToString::to_string)
            .collect();
    }
    if let Some(timeout) = get("API_TIMEOUT") {
        config.upstream.timeout_secs =
            parse_timeout_secs(&timeout).ok_or_else(|| invalid_env("API_TIMEOUT", &timeout))?;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level.trim().to_lowercase();
    }

    Ok(())
}

/// Parses a timeout given in (possibly fractional) seconds, rounding up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above the cast
fn parse_timeout_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }
    let secs: f64 = value.parse().ok()?;
    if !secs.is_finite() || secs <= 0.0 || secs > 86_400.0 {
        return None;
    }
    Some(secs.ceil() as u64)
}

fn invalid_env(name: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
    }
}
