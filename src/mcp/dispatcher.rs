//! JSON-RPC request routing.
//!
//! The [`Dispatcher`] turns a raw request body into exactly one
//! [`JsonRpcResponse`]. It holds no mutable state; the only shared resource
//! is the legislation client, which is used for tool calls.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::legislation::LegislationClient;
use crate::mcp::protocol::{
    parse_request, JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
    SERVER_VERSION,
};
use crate::mcp::registry;
use crate::mcp::tools;

/// Server name reported by `listActions`.
pub const ACTIONS_SERVER_NAME: &str = "Mevzuat MCP";

/// Methods understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Capability handshake.
    Initialize,
    /// Tool discovery.
    ToolsList,
    /// Tool discovery in the actions vocabulary.
    ListActions,
    /// Tool invocation.
    ToolsCall,
}

impl Method {
    /// Parses a method name. Returns `None` for unknown methods.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Self::Initialize),
            "tools/list" => Some(Self::ToolsList),
            "listActions" => Some(Self::ListActions),
            "tools/call" => Some(Self::ToolsCall),
            _ => None,
        }
    }
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

impl Default for ToolCapabilities {
    fn default() -> Self {
        Self { list_changed: true }
    }
}

/// Server information for the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Server version.
    pub version: &'static str,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME,
            version: SERVER_VERSION,
        }
    }
}

/// Result of `initialize`.
#[must_use]
pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": ServerCapabilities::default(),
        "serverInfo": ServerInfo::default(),
    })
}

/// Result of `tools/list`.
#[must_use]
pub fn tools_list_result() -> Value {
    json!({ "tools": registry::list() })
}

/// Result of `listActions`, also served by `GET /mcp/actions`.
#[must_use]
pub fn list_actions_result() -> Value {
    let actions: Vec<Value> = registry::list()
        .iter()
        .map(registry::ToolDefinition::to_action)
        .collect();
    json!({
        "count": actions.len(),
        "actions": actions,
        "server": ACTIONS_SERVER_NAME,
        "version": SERVER_VERSION,
    })
}

/// Routes JSON-RPC requests to tools.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn LegislationClient>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher backed by `client`.
    #[must_use]
    pub fn new(client: Arc<dyn LegislationClient>) -> Self {
        Self { client }
    }

    /// Handles one raw request body.
    pub async fn handle(&self, body: &[u8]) -> JsonRpcResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("rpc", %request_id);

        async {
            match parse_request(body) {
                Ok(request) => self.dispatch(request).await,
                Err(response) => {
                    if let Some(e) = response.error_data() {
                        warn!(error = %e.message, "Rejected malformed request");
                    }
                    *response
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Handles an already parsed request.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, id = %request.id, "Dispatching request");

        let Some(method) = Method::from_name(&request.method) else {
            warn!(method = %request.method, "Unknown method");
            return JsonRpcResponse::method_not_found(request.id, &request.method);
        };

        match method {
            Method::Initialize => JsonRpcResponse::success(request.id, initialize_result()),
            Method::ToolsList => JsonRpcResponse::success(request.id, tools_list_result()),
            Method::ListActions => JsonRpcResponse::success(request.id, list_actions_result()),
            Method::ToolsCall => self.tools_call(request.id, request.params).await,
        }
    }

    async fn tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let mut params = match params {
            Some(Value::Object(params)) if !params.is_empty() => params,
            _ => {
                warn!("tools/call without params");
                return JsonRpcResponse::invalid_params(id);
            }
        };

        let name = match params.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => Value::Null.to_string(),
        };

        let Some(definition) = registry::lookup(&name) else {
            warn!(tool = %name, "Tool not found");
            return JsonRpcResponse::tool_not_found(id, &name);
        };
        let tool = definition.tool;

        let arguments = match params.remove("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => {
                warn!(tool = %tool, "tools/call arguments must be an object");
                return JsonRpcResponse::invalid_params(id);
            }
        };

        match tools::execute(self.client.as_ref(), tool, &arguments).await {
            Ok(output) => JsonRpcResponse::success(id, json!({ "content": output.into_content() })),
            Err(e) => {
                error!(tool = %tool, error = %e, "Tool execution error");
                JsonRpcResponse::tool_execution_error(id, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legislation::testing::{Call, StubClient};

    fn dispatcher() -> (Dispatcher, Arc<StubClient>) {
        let client = Arc::new(StubClient::default());
        (Dispatcher::new(client.clone()), client)
    }

    async fn call(dispatcher: &Dispatcher, body: Value) -> Value {
        let response = dispatcher.handle(body.to_string().as_bytes()).await;
        serde_json::to_value(response).unwrap()
    }

    fn assert_exactly_one_outcome(response: &Value) {
        let has_result = response.get("result").is_some();
        let has_error = response.get("error").is_some();
        assert!(has_result != has_error, "response: {response}");
    }

    #[tokio::test]
    async fn initialize_reports_protocol_version() {
        let (dispatcher, _) = dispatcher();
        let response = call(
            &dispatcher,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .await;

        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], true);
        assert_eq!(response["result"]["serverInfo"]["name"], "MevzuatGovTrMCP");
    }

    #[tokio::test]
    async fn tools_list_matches_registry() {
        let (dispatcher, _) = dispatcher();
        let request = json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"});
        let first = call(&dispatcher, request.clone()).await;
        let second = call(&dispatcher, request).await;

        let names: Vec<&str> = first["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        let expected: Vec<&str> = registry::list().iter().map(|d| d.name).collect();
        assert_eq!(names, expected);
        assert_eq!(first, second);
        assert!(first["result"]["tools"][0].get("inputSchema").is_some());
    }

    #[tokio::test]
    async fn list_actions_count_matches_registry() {
        let (dispatcher, _) = dispatcher();
        let response = call(
            &dispatcher,
            json!({"jsonrpc": "2.0", "id": 3, "method": "listActions"}),
        )
        .await;

        assert_eq!(response["result"]["count"], registry::list().len());
        assert_eq!(response["result"]["server"], ACTIONS_SERVER_NAME);
        assert_eq!(
            response["result"]["actions"].as_array().unwrap().len(),
            registry::list().len()
        );
    }

    #[tokio::test]
    async fn id_is_echoed_on_success_and_failure() {
        let (dispatcher, _) = dispatcher();
        for method in ["initialize", "tools/list", "listActions", "tools/call", "nope"] {
            let response = call(
                &dispatcher,
                json!({"jsonrpc": "2.0", "id": 42, "method": method}),
            )
            .await;
            assert_eq!(response["id"], 42, "method {method}");
            assert_exactly_one_outcome(&response);
        }
    }

    #[tokio::test]
    async fn unknown_method() {
        let (dispatcher, _) = dispatcher();
        let response = call(
            &dispatcher,
            json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn unknown_tool() {
        let (dispatcher, client) = dispatcher();
        let response = call(
            &dispatcher,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": "drop_tables", "arguments": {}}
            }),
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("drop_tables"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn tools_call_invalid_params() {
        let (dispatcher, _) = dispatcher();
        for params in [
            Value::Null,
            json!([1, 2]),
            json!({}),
            json!({"name": "get_article_tree", "arguments": "mevzuat_id=1"}),
        ] {
            let response = call(
                &dispatcher,
                json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call", "params": params}),
            )
            .await;
            assert_eq!(response["error"]["code"], -32602, "params {params}");
            assert_eq!(response["error"]["message"], "Invalid params");
        }
    }

    #[tokio::test]
    async fn tools_call_without_string_name_is_tool_not_found() {
        let (dispatcher, client) = dispatcher();
        for (params, message) in [
            (json!({"arguments": {}}), "Tool not found: null"),
            (json!({"name": 7}), "Tool not found: 7"),
            (json!({"name": null, "arguments": {}}), "Tool not found: null"),
        ] {
            let response = call(
                &dispatcher,
                json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": params}),
            )
            .await;
            assert_eq!(response["id"], 2);
            assert_eq!(response["error"]["code"], -32601, "params {params}");
            assert_eq!(response["error"]["message"], message);
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_required_argument_is_soft_error() {
        let (dispatcher, client) = dispatcher();
        let response = call(
            &dispatcher,
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "get_article_tree"}
            }),
        )
        .await;

        assert_eq!(
            response["result"]["content"],
            json!({"error": "mevzuat_id is required"})
        );
        assert!(response.get("error").is_none());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn search_without_arguments_uses_defaults() {
        let (dispatcher, client) = dispatcher();
        let response = call(
            &dispatcher,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": {"name": "search_documents", "arguments": null}
            }),
        )
        .await;

        assert_exactly_one_outcome(&response);
        let calls = client.calls();
        let [Call::Search(criteria)] = calls.as_slice() else {
            panic!("expected one search call, got {calls:?}");
        };
        assert_eq!((criteria.page_number, criteria.page_size), (1, 5));
    }

    #[tokio::test]
    async fn backend_failure_is_result_not_error() {
        let dispatcher = Dispatcher::new(Arc::new(StubClient::failing("timeout")));
        let response = call(
            &dispatcher,
            json!({
                "jsonrpc": "2.0",
                "id": 8,
                "method": "tools/call",
                "params": {"name": "get_document_content", "arguments": {"mevzuat_id": "1"}}
            }),
        )
        .await;

        assert_eq!(
            response["result"]["content"]["error"],
            "Upstream error: timeout"
        );
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn non_json_body() {
        let (dispatcher, _) = dispatcher();
        let response = serde_json::to_value(dispatcher.handle(b"{not json").await).unwrap();
        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(response["id"], Value::Null);
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::from_name("tools/call"), Some(Method::ToolsCall));
        assert_eq!(Method::from_name("listActions"), Some(Method::ListActions));
        assert_eq!(Method::from_name("ping"), None);
    }
}
