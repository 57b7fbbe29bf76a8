//! Model Context Protocol (MCP) endpoint.
//!
//! Exposes legislation lookups as MCP tools over JSON-RPC 2.0, served over
//! HTTP (`POST /mcp`) or newline-delimited stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           MCP Endpoint                           │
//! │                                                                  │
//! │  ┌────────────┐   ┌──────────┐   ┌────────────┐   ┌───────────┐  │
//! │  │  server /  │──▶│   auth   │──▶│ dispatcher │──▶│   tools   │  │
//! │  │ transport  │   │ (HTTP)   │   │            │   │           │  │
//! │  └────────────┘   └──────────┘   └────────────┘   └───────────┘  │
//! │                                        │                │        │
//! │                                        ▼                ▼        │
//! │                                  ┌──────────┐   ┌──────────────┐ │
//! │                                  │ registry │   │ Legislation- │ │
//! │                                  │          │   │    Client    │ │
//! │                                  └──────────┘   └──────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod auth;
pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod transport;

pub use auth::{AuthContext, AuthGate, AuthRejection};
pub use dispatcher::{Dispatcher, Method};
pub use protocol::{JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION};
pub use registry::{ToolDefinition, ToolName};
pub use server::{AppState, ServerError};
pub use transport::StdioTransport;
