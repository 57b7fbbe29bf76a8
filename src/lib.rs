//! mevzuat-mcp: MCP server for Turkish legislation from mevzuat.gov.tr
//!
//! Exposes search and retrieval of laws, regulations and other legislation
//! as MCP tools, so AI assistants can look up the text of Turkish law.
//!
//! # Tools
//!
//! - `search_documents`: full-text or number search, paginated
//! - `get_article_tree`: table of contents of a document
//! - `get_article_content`: content of one article
//! - `get_document_content`: content of a whole document
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`legislation`]: Upstream client and domain types
//! - [`mcp`]: MCP protocol, dispatch and transports

pub mod config;
pub mod error;
pub mod legislation;
pub mod mcp;
