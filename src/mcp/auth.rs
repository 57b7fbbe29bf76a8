//! Bearer credential and origin checks for `POST /mcp`.
//!
//! The gate runs before any JSON-RPC parsing. The credential is checked
//! first, so a wrong key is always a 401 regardless of the origin.

use axum::http::{header, HeaderMap, StatusCode};
use subtle::ConstantTimeEq;

/// Caller identity derived from request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Bearer token, empty when absent or malformed.
    pub credential: String,
    /// `Origin` header value, if present. Bytes that are not valid UTF-8
    /// are replaced, so an undecodable origin never matches the allowed one.
    pub origin: Option<String>,
}

impl AuthContext {
    /// Reads `Authorization: Bearer <token>` and `Origin` from `headers`.
    ///
    /// The scheme is matched case-insensitively.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let credential = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| {
                let (scheme, token) = v.trim().split_once(' ')?;
                scheme
                    .eq_ignore_ascii_case("bearer")
                    .then(|| token.trim().to_string())
            })
            .unwrap_or_default();

        let origin = headers
            .get(header::ORIGIN)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        Self { credential, origin }
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Missing or wrong API key.
    InvalidCredential,
    /// Origin present and not the allowed one.
    UnauthorizedOrigin,
}

impl AuthRejection {
    /// HTTP status for this rejection.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::UnauthorizedOrigin => StatusCode::FORBIDDEN,
        }
    }

    /// Machine-readable reason, used in logs.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::UnauthorizedOrigin => "unauthorized_origin",
        }
    }

    /// Message returned in the response body.
    #[must_use]
    pub const fn detail(self) -> &'static str {
        match self {
            Self::InvalidCredential => "Invalid API key",
            Self::UnauthorizedOrigin => "Unauthorized origin",
        }
    }
}

/// Stateless credential and origin check.
#[derive(Clone)]
pub struct AuthGate {
    api_key: String,
    allowed_origin: Option<String>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("api_key", &"<redacted>")
            .field("allowed_origin", &self.allowed_origin)
            .finish()
    }
}

impl AuthGate {
    /// Creates a gate for `api_key`. With no `allowed_origin`, every request
    /// that carries a non-empty `Origin` is refused.
    #[must_use]
    pub fn new(api_key: impl Into<String>, allowed_origin: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            allowed_origin,
        }
    }

    /// Checks `context` against the configured key and origin.
    ///
    /// # Errors
    ///
    /// Returns the reason the request must be refused.
    pub fn authorize(&self, context: &AuthContext) -> Result<(), AuthRejection> {
        let key_matches: bool = context
            .credential
            .as_bytes()
            .ct_eq(self.api_key.as_bytes())
            .into();
        if context.credential.is_empty() || !key_matches {
            return Err(AuthRejection::InvalidCredential);
        }

        match context.origin.as_deref() {
            None | Some("") => Ok(()),
            Some(origin) if self.allowed_origin.as_deref() == Some(origin) => Ok(()),
            Some(_) => Err(AuthRejection::UnauthorizedOrigin),
        }
    }
}
