//! The fixed set of tools exposed over MCP.
//!
//! Tool names form a closed set ([`ToolName`]). The registry keeps one
//! [`ToolDefinition`] per tool, in registration order, for the lifetime of
//! the process.

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::legislation::{LegislationType, SortDirection, SortField};

/// Default page number for `search_documents`.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Default page size for `search_documents`.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// The tools this server can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// Full-text and number search.
    SearchDocuments,
    /// Table of contents of a document.
    GetArticleTree,
    /// Content of one article.
    GetArticleContent,
    /// Content of a whole document.
    GetDocumentContent,
}

impl ToolName {
    /// All tools, in registration order.
    pub const ALL: [Self; 4] = [
        Self::SearchDocuments,
        Self::GetArticleTree,
        Self::GetArticleContent,
        Self::GetDocumentContent,
    ];

    /// Parses a wire name. Returns `None` for unregistered names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchDocuments => "search_documents",
            Self::GetArticleTree => "get_article_tree",
            Self::GetArticleContent => "get_article_content",
            Self::GetDocumentContent => "get_document_content",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool definition as returned by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
    /// Tool this definition belongs to.
    #[serde(skip)]
    pub tool: ToolName,
}

impl ToolDefinition {
    /// Names of the required arguments, in declaration order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Renders this definition as a `listActions` entry.
    #[must_use]
    pub fn to_action(&self) -> Value {
        json!({
            "label": self.description,
            "name": self.name,
            "type": "string",
            "required": true,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

/// Returns every registered tool, in registration order.
#[must_use]
pub fn list() -> &'static [ToolDefinition] {
    static TOOLS: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    TOOLS.get_or_init(|| ToolName::ALL.into_iter().map(definition).collect())
}

/// Looks up a tool by wire name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static ToolDefinition> {
    ToolName::from_name(name).map(get)
}

/// Returns the definition of a known tool.
#[must_use]
pub fn get(tool: ToolName) -> &'static ToolDefinition {
    // `list()` holds one entry per `ToolName::ALL` element in the same order.
    let index = ToolName::ALL.iter().position(|t| *t == tool).unwrap_or_default();
    &list()[index]
}

fn definition(tool: ToolName) -> ToolDefinition {
    let (description, input_schema) = match tool {
        ToolName::SearchDocuments => (
            "Searches for Turkish legislation on mevzuat.gov.tr",
            json!({
                "type": "object",
                "properties": {
                    "phrase": {
                        "type": "string",
                        "description": "Turkish full-text search phrase"
                    },
                    "mevzuat_no": {
                        "type": "string",
                        "description": "The specific number of the legislation"
                    },
                    "mevzuat_turleri": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": LegislationType::ALL.map(LegislationType::as_str)
                        },
                        "description": "Filter by legislation types; all types when omitted"
                    },
                    "sort_field": {
                        "type": "string",
                        "enum": SortField::ALL.map(SortField::as_str),
                        "default": SortField::default().as_str(),
                        "description": "Field to sort results by"
                    },
                    "sort_direction": {
                        "type": "string",
                        "enum": ["asc", "desc"],
                        "default": SortDirection::default().as_str(),
                        "description": "Sorting direction"
                    },
                    "page_number": {
                        "type": "integer",
                        "default": DEFAULT_PAGE_NUMBER,
                        "description": "Page number for pagination"
                    },
                    "page_size": {
                        "type": "integer",
                        "default": DEFAULT_PAGE_SIZE,
                        "description": "Number of results to return per page"
                    }
                },
                "required": []
            }),
        ),
        ToolName::GetArticleTree => (
            "Retrieves the table of contents for a specific legislation",
            json!({
                "type": "object",
                "properties": {
                    "mevzuat_id": {
                        "type": "string",
                        "description": "The ID of the legislation"
                    }
                },
                "required": ["mevzuat_id"]
            }),
        ),
        ToolName::GetArticleContent => (
            "Retrieves the content of a specific article",
            json!({
                "type": "object",
                "properties": {
                    "mevzuat_id": {
                        "type": "string",
                        "description": "The ID of the legislation"
                    },
                    "madde_id": {
                        "type": "string",
                        "description": "The ID of the specific article"
                    }
                },
                "required": ["mevzuat_id", "madde_id"]
            }),
        ),
        ToolName::GetDocumentContent => (
            "Retrieves the full content of a legislation document",
            json!({
                "type": "object",
                "properties": {
                    "mevzuat_id": {
                        "type": "string",
                        "description": "The ID of the legislation"
                    }
                },
                "required": ["mevzuat_id"]
            }),
        ),
    };

    ToolDefinition {
        name: tool.as_str(),
        description,
        input_schema,
        tool,
    }
}

/// Required arguments that were absent, `null` or empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequired {
    /// Missing field names, in declaration order.
    pub fields: Vec<String>,
}

impl std::fmt::Display for MissingRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fields.as_slice() {
            [] => Ok(()),
            [only] => write!(f, "{only} is required"),
            [init @ .., last] => write!(f, "{} and {last} are required", init.join(", ")),
        }
    }
}

impl std::error::Error for MissingRequired {}

/// Checks that every required argument of `definition` is present.
///
/// Extra arguments are ignored. Types are not checked.
///
/// # Errors
///
/// Returns [`MissingRequired`] listing the absent fields.
pub fn validate_arguments(
    definition: &ToolDefinition,
    arguments: &Map<String, Value>,
) -> Result<(), MissingRequired> {
    let fields: Vec<String> = definition
        .required()
        .filter(|name| match arguments.get(*name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(ToString::to_string)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(MissingRequired { fields })
    }
}
