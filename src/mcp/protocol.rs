//! JSON-RPC 2.0 message types for the MCP endpoint.
//!
//! Every inbound call produces exactly one [`JsonRpcResponse`]. The response
//! carries either a `result` or an `error`, never both; this is encoded in
//! [`Outcome`], which is flattened into the envelope when serialised.
//!
//! # Request IDs
//!
//! IDs may be strings, integers or `null`. The ID of a request is echoed
//! verbatim. When a body cannot be parsed as JSON the response ID is `null`;
//! when it is JSON but not a valid envelope, the ID is recovered from the
//! partial document if it holds a valid ID value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported in the `initialize` result.
pub const SERVER_NAME: &str = "MevzuatGovTrMCP";

/// Server version reported by `initialize`, `listActions` and discovery routes.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// Numeric request ID above `i64::MAX`.
    Unsigned(u64),
    /// String request ID.
    String(String),
    /// Explicit or implied `null`.
    #[default]
    Null,
}

impl RequestId {
    /// Interprets a JSON value as an ID, if it has a valid ID type.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Number)
                .or_else(|| n.as_u64().map(Self::Unsigned)),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// A parsed JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// Request identifier, `Null` when the envelope had none.
    pub id: RequestId,

    /// The method to invoke.
    pub method: String,

    /// Optional parameters, exactly as sent.
    pub params: Option<Value>,
}

/// Standard JSON-RPC 2.0 error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The method or tool does not exist.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal or tool execution error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,
}

impl JsonRpcErrorData {
    /// Creates a new error from an error code.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }
}

/// The body of a response: a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The method succeeded.
    Result(Value),
    /// The method failed at the protocol level.
    Error(JsonRpcErrorData),
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: String,

    /// The request ID this response corresponds to.
    pub id: RequestId,

    /// Result or error.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Creates a new error response.
    #[must_use]
    pub fn error(id: RequestId, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::error(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// Creates a tool not found error response.
    #[must_use]
    pub fn tool_not_found(id: RequestId, tool: &str) -> Self {
        Self::error(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Tool not found: {tool}"),
            ),
        )
    }

    /// Creates an invalid params error response.
    #[must_use]
    pub fn invalid_params(id: RequestId) -> Self {
        Self::error(id, JsonRpcErrorData::from_code(ErrorCode::InvalidParams))
    }

    /// Creates an internal error response.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl std::fmt::Display) -> Self {
        Self::error(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::InternalError,
                format!("Internal error: {message}"),
            ),
        )
    }

    /// Creates a tool execution error response.
    #[must_use]
    pub fn tool_execution_error(id: RequestId, message: impl std::fmt::Display) -> Self {
        Self::error(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::InternalError,
                format!("Tool execution error: {message}"),
            ),
        )
    }

    /// Returns the result, if this is a success response.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    /// Returns the error, if this is an error response.
    #[must_use]
    pub const fn error_data(&self) -> Option<&JsonRpcErrorData> {
        match &self.outcome {
            Outcome::Result(_) => None,
            Outcome::Error(e) => Some(e),
        }
    }
}

/// Parses a request body into a [`JsonRpcRequest`].
///
/// # Errors
///
/// Returns a ready-made `-32603` response if the body is not JSON or is not
/// a valid request envelope.
pub fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, Box<JsonRpcResponse>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Box::new(JsonRpcResponse::internal_error(RequestId::Null, e)))?;

    let Value::Object(mut obj) = value else {
        return Err(Box::new(JsonRpcResponse::internal_error(
            RequestId::Null,
            "request must be a JSON object",
        )));
    };

    let id = match obj.get("id") {
        None => Some(RequestId::Null),
        Some(v) => RequestId::from_value(v),
    };
    let invalid = |message: &str| {
        Box::new(JsonRpcResponse::internal_error(
            id.clone().unwrap_or_default(),
            message,
        ))
    };

    if let Some(version) = obj.get("jsonrpc") {
        if version.as_str() != Some("2.0") {
            return Err(invalid("jsonrpc field must be \"2.0\""));
        }
    }

    let Some(request_id) = id.clone() else {
        return Err(invalid("id must be a string, an integer or null"));
    };

    let method = match obj.get("method") {
        Some(Value::String(m)) => m.clone(),
        Some(_) => return Err(invalid("method must be a string")),
        None => return Err(invalid("method field is required")),
    };

    let params = obj.remove("params");

    Ok(JsonRpcRequest {
        id: request_id,
        method,
        params,
    })
}
