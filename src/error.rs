//! Startup errors for the mevzuat-mcp server.
//!
//! Configuration comes from an optional JSON file and a handful of
//! environment variables (`HOST`, `PORT`, `MCP_API_KEY`, `API_TIMEOUT`, ...).
//! Any failure here stops the process before a listener is bound. Messages
//! name the offending file, variable or setting; the API key itself is
//! never echoed.

use std::path::PathBuf;

use thiserror::Error;

/// Why the server configuration could not be assembled.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly named configuration file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path given on the command line.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}")]
    ReadError {
        /// Configuration file path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::config::Config`].
    #[error("failed to parse configuration file {path}")]
    ParseError {
        /// Configuration file path.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An environment override could not be parsed, e.g. `PORT=http`.
    #[error("invalid value for environment variable {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value as found in the environment.
        value: String,
    },

    /// The merged settings are unusable, e.g. an empty `auth.api_key`.
    #[error("invalid configuration: {message}")]
    ValidationError {
        /// Names the setting and what is wrong with it.
        message: String,
    },
}
