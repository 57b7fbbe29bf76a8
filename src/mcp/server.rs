//! HTTP transport for the MCP endpoint.
//!
//! # Routes
//!
//! | Route | Auth | Body |
//! |---|---|---|
//! | `POST /mcp` | Bearer + origin | JSON-RPC response |
//! | `GET /mcp` | none | Endpoint info |
//! | `GET /mcp/tools` | none | Tool definitions |
//! | `GET /mcp/actions` | none | `listActions` result |
//! | `GET /mcp/flowise-actions` | none | `listActions` result |
//! | `GET /health` | none | Liveness |
//! | `GET /` | none | Service info |
//!
//! JSON-RPC failures are reported with HTTP 200; only the auth gate uses
//! HTTP status codes (401/403).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, warn, Level};

use crate::config::CorsConfig;
use crate::mcp::auth::{AuthContext, AuthGate};
use crate::mcp::dispatcher::{list_actions_result, Dispatcher};
use crate::mcp::protocol::{MCP_PROTOCOL_VERSION, SERVER_VERSION};
use crate::mcp::registry;

/// Errors from running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an IO error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared state of the HTTP server.
#[derive(Debug)]
pub struct AppState {
    dispatcher: Dispatcher,
    auth: AuthGate,
    started: Instant,
}

impl AppState {
    /// Creates the state for one server instance.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, auth: AuthGate) -> Self {
        Self {
            dispatcher,
            auth,
            started: Instant::now(),
        }
    }
}

/// Builds the router with CORS and request tracing applied.
#[must_use]
pub fn router(state: Arc<AppState>, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/mcp", get(mcp_info).post(mcp_endpoint))
        .route("/mcp/tools", get(mcp_tools))
        .route("/mcp/actions", get(mcp_actions))
        .route("/mcp/flowise-actions", get(mcp_actions))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(cors_layer(cors))
}

/// Builds the CORS layer.
///
/// `"*"` allows any origin without credentials. An explicit list allows
/// credentials and mirrors the requested methods and headers.
#[must_use]
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Binds `addr` and serves until SIGINT/SIGTERM (Ctrl+C on Windows).
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    info!(%addr, "MCP endpoint listening on http://{addr}/mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = shutdown_signal().await {
                warn!(error = %e, "Failed to listen for shutdown signals");
                std::future::pending::<()>().await;
            }
        })
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");
    Ok(())
}

/// Completes when the process is asked to stop.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
#[cfg(unix)]
pub async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
    }
    Ok(())
}

/// Completes when the process is asked to stop.
///
/// # Errors
///
/// Returns an error if the Ctrl+C handler cannot be installed.
#[cfg(windows)]
pub async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}

async fn mcp_endpoint(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let context = AuthContext::from_headers(&headers);
    if let Err(rejection) = state.auth.authorize(&context) {
        warn!(
            reason = rejection.reason(),
            origin = context.origin.as_deref().unwrap_or(""),
            "Rejected MCP request"
        );
        let body = Json(json!({ "detail": rejection.detail() }));
        return if rejection.status() == StatusCode::UNAUTHORIZED {
            (
                rejection.status(),
                [(header::WWW_AUTHENTICATE, "Bearer")],
                body,
            )
                .into_response()
        } else {
            (rejection.status(), body).into_response()
        };
    }

    Json(state.dispatcher.handle(&body).await).into_response()
}

async fn mcp_info() -> Json<Value> {
    Json(json!({
        "message": "Mevzuat MCP Web Server",
        "version": SERVER_VERSION,
        "protocol": "MCP",
        "protocol_version": MCP_PROTOCOL_VERSION,
        "endpoint": "POST /mcp for MCP requests",
        "tools_count": registry::list().len(),
        "timestamp": timestamp(),
    }))
}

async fn mcp_tools() -> Json<Value> {
    let tools = registry::list();
    Json(json!({
        "message": "Available MCP Tools",
        "count": tools.len(),
        "tools": tools,
    }))
}

async fn mcp_actions() -> Json<Value> {
    Json(list_actions_result())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "uptime_seconds": state.started.elapsed().as_secs(),
        "version": SERVER_VERSION,
        "tools_count": registry::list().len(),
        "mcp_endpoint": "/mcp",
    }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Mevzuat MCP Server",
        "description": "MCP server for Turkish legislation from mevzuat.gov.tr",
        "version": SERVER_VERSION,
        "protocol": "MCP",
        "endpoints": {
            "mcp": "POST /mcp",
            "mcp_info": "GET /mcp",
            "tools": "GET /mcp/tools",
            "actions": "GET /mcp/actions",
            "flowise_actions": "GET /mcp/flowise-actions",
            "health": "GET /health",
        },
        "tools_count": registry::list().len(),
    }))
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
