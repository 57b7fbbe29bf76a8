//! Error types for upstream legislation API operations.

use thiserror::Error;

/// Result type for legislation client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the upstream legislation API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request could not be sent or the response body could not be read.
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream did not answer within the configured timeout.
    #[error("Request to {endpoint} timed out after {timeout_secs}s")]
    Timeout {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The upstream answered with a non-success HTTP status.
    #[error("Upstream returned HTTP {status} for {endpoint}")]
    Status {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The upstream reported a failure inside a well-formed response.
    #[error("Upstream error: {message}")]
    Upstream {
        /// Message reported by the upstream.
        message: String,
    },

    /// The response payload did not have the expected shape.
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse {
        /// Upstream endpoint name.
        endpoint: &'static str,
        /// Description of what's wrong.
        message: String,
    },
}

impl ClientError {
    /// Creates an upstream-reported error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            endpoint,
            message: message.into(),
        }
    }

    /// Returns `true` if this error is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_display() {
        let err = ClientError::upstream("Kayıt bulunamadı");
        assert_eq!(err.to_string(), "Upstream error: Kayıt bulunamadı");
    }

    #[test]
    fn timeout_error_display() {
        let err = ClientError::Timeout {
            endpoint: "searchDocuments",
            timeout_secs: 30,
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Request to searchDocuments timed out after 30s"
        );
    }

    #[test]
    fn status_error_display() {
        let err = ClientError::Status {
            endpoint: "getDocumentContent",
            status: 502,
        };
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("502"));
    }
}
