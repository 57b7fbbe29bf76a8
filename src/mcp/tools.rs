//! Tool adapters.
//!
//! Each adapter turns `tools/call` arguments into a [`LegislationClient`]
//! call and flattens the answer into a plain JSON mapping. Backend failures
//! and missing required arguments are reported as data (`{"error": ...}`)
//! rather than as protocol errors; only a failure to serialise a result
//! escapes as [`ToolExecutionError`].

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::legislation::{
    ClientError, LegislationClient, LegislationType, SearchCriteria, SortDirection, SortField,
};
use crate::mcp::registry::{
    self, MissingRequired, ToolName, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE,
};

/// Largest page size passed upstream.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Informational message for searches without matches.
pub const NO_RESULTS_MESSAGE: &str = "No legislation found matching the specified criteria.";

/// What a tool produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// The flattened backend result.
    Content(Value),
    /// A tool-level failure reported to the caller as data.
    SoftError(String),
}

impl ToolOutput {
    /// Returns the value placed under `result.content`.
    #[must_use]
    pub fn into_content(self) -> Value {
        match self {
            Self::Content(value) => value,
            Self::SoftError(message) => json!({ "error": message }),
        }
    }
}

/// A failure that escapes a tool adapter.
#[derive(Debug, Error)]
pub enum ToolExecutionError {
    /// The backend result could not be turned into JSON.
    #[error("failed to serialise {tool} result: {source}")]
    Serialise {
        /// The tool that produced the result.
        tool: ToolName,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Validates `arguments` and runs `tool` against `client`.
///
/// # Errors
///
/// Returns an error only if the backend result cannot be serialised.
pub async fn execute(
    client: &dyn LegislationClient,
    tool: ToolName,
    arguments: &Map<String, Value>,
) -> Result<ToolOutput, ToolExecutionError> {
    if let Err(missing) = registry::validate_arguments(registry::get(tool), arguments) {
        warn!(tool = %tool, error = %missing, "Rejected tool call with missing arguments");
        return Ok(ToolOutput::SoftError(missing.to_string()));
    }

    info!(tool = %tool, "Executing tool");

    let output = match tool {
        ToolName::SearchDocuments => search_documents(client, arguments).await?,
        ToolName::GetArticleTree => get_article_tree(client, arguments).await?,
        ToolName::GetArticleContent => get_article_content(client, arguments).await?,
        ToolName::GetDocumentContent => get_document_content(client, arguments).await?,
    };

    if let ToolOutput::SoftError(message) = &output {
        warn!(tool = %tool, error = %message, "Tool call failed");
    }

    Ok(output)
}

async fn search_documents(
    client: &dyn LegislationClient,
    arguments: &Map<String, Value>,
) -> Result<ToolOutput, ToolExecutionError> {
    let criteria = match search_criteria(arguments) {
        Ok(criteria) => criteria,
        Err(message) => return Ok(ToolOutput::SoftError(message)),
    };

    match client.search(&criteria).await {
        Ok(mut result) => {
            if result.documents.is_empty() && result.error_message.is_none() {
                result.error_message = Some(NO_RESULTS_MESSAGE.to_string());
            }
            content(ToolName::SearchDocuments, &result)
        }
        Err(e) => Ok(backend_error(ToolName::SearchDocuments, &e)),
    }
}

fn search_criteria(arguments: &Map<String, Value>) -> Result<SearchCriteria, String> {
    let defaults = SearchCriteria::default();
    Ok(SearchCriteria {
        phrase: string_arg(arguments, "phrase"),
        mevzuat_no: string_arg(arguments, "mevzuat_no"),
        types: types_arg(arguments)?.unwrap_or(defaults.types),
        page_number: page_arg(arguments, "page_number", DEFAULT_PAGE_NUMBER),
        page_size: page_arg(arguments, "page_size", DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        sort_field: name_arg(arguments, "sort_field", SortField::from_name)?
            .unwrap_or(defaults.sort_field),
        sort_direction: name_arg(arguments, "sort_direction", SortDirection::from_name)?
            .unwrap_or(defaults.sort_direction),
    })
}

async fn get_article_tree(
    client: &dyn LegislationClient,
    arguments: &Map<String, Value>,
) -> Result<ToolOutput, ToolExecutionError> {
    let Some(mevzuat_id) = string_arg(arguments, "mevzuat_id") else {
        return Ok(missing(&["mevzuat_id"]));
    };

    match client.article_tree(&mevzuat_id).await {
        Ok(nodes) => content(ToolName::GetArticleTree, &json!({ "nodes": nodes })),
        Err(e) => Ok(backend_error(ToolName::GetArticleTree, &e)),
    }
}

async fn get_article_content(
    client: &dyn LegislationClient,
    arguments: &Map<String, Value>,
) -> Result<ToolOutput, ToolExecutionError> {
    let (Some(mevzuat_id), Some(madde_id)) = (
        string_arg(arguments, "mevzuat_id"),
        string_arg(arguments, "madde_id"),
    ) else {
        let absent: Vec<&str> = ["mevzuat_id", "madde_id"]
            .into_iter()
            .filter(|key| string_arg(arguments, key).is_none())
            .collect();
        return Ok(missing(&absent));
    };

    // Documents without an article tree are addressed by their own id.
    if madde_id == mevzuat_id {
        return match client.document_content(&mevzuat_id).await {
            Ok(document) => content(
                ToolName::GetArticleContent,
                &json!({
                    "mevzuat_id": document.mevzuat_id,
                    "madde_id": madde_id,
                    "content": document.content,
                    "mime_type": document.mime_type,
                }),
            ),
            Err(e) => Ok(backend_error(ToolName::GetArticleContent, &e)),
        };
    }

    match client.article_content(&mevzuat_id, &madde_id).await {
        Ok(article) => content(ToolName::GetArticleContent, &article),
        Err(e) => Ok(backend_error(ToolName::GetArticleContent, &e)),
    }
}

async fn get_document_content(
    client: &dyn LegislationClient,
    arguments: &Map<String, Value>,
) -> Result<ToolOutput, ToolExecutionError> {
    let Some(mevzuat_id) = string_arg(arguments, "mevzuat_id") else {
        return Ok(missing(&["mevzuat_id"]));
    };

    match client.document_content(&mevzuat_id).await {
        Ok(document) => content(ToolName::GetDocumentContent, &document),
        Err(e) => Ok(backend_error(ToolName::GetDocumentContent, &e)),
    }
}

fn content<T: Serialize>(tool: ToolName, value: &T) -> Result<ToolOutput, ToolExecutionError> {
    serde_json::to_value(value)
        .map(ToolOutput::Content)
        .map_err(|source| ToolExecutionError::Serialise { tool, source })
}

/// Required arguments that passed presence validation but are unusable,
/// such as whitespace or booleans, use the same message as absent ones.
fn missing(fields: &[&str]) -> ToolOutput {
    let missing = MissingRequired {
        fields: fields.iter().map(ToString::to_string).collect(),
    };
    ToolOutput::SoftError(missing.to_string())
}

fn backend_error(tool: ToolName, error: &ClientError) -> ToolOutput {
    debug!(tool = %tool, timed_out = error.is_timeout(), "Backend call failed");
    ToolOutput::SoftError(error.to_string())
}

/// Reads a text argument. Numbers are accepted and rendered as text;
/// empty strings count as absent.
fn string_arg(arguments: &Map<String, Value>, key: &str) -> Option<String> {
    match arguments.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an optional enumerated argument such as `sort_field`.
///
/// Absent, `null` and empty values yield `Ok(None)`.
fn name_arg<T>(
    arguments: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse(s)
            .map(Some)
            .ok_or_else(|| format!("Invalid {key}: {s}")),
        Some(other) => Err(format!("Invalid {key}: {other}")),
    }
}

/// Reads `mevzuat_turleri` as a list of type names, a JSON-encoded list or
/// a comma-separated string. An empty list means every type.
fn types_arg(arguments: &Map<String, Value>) -> Result<Option<Vec<LegislationType>>, String> {
    let names: Vec<String> = match arguments.get("mevzuat_turleri") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(format!("Invalid mevzuat_turleri entry: {other}")),
            })
            .collect::<Result<_, _>>()?,
        Some(Value::String(s)) if s.trim_start().starts_with('[') => {
            serde_json::from_str::<Vec<String>>(s)
                .map_err(|e| format!("mevzuat_turleri is not a JSON list of strings: {e}"))?
        }
        Some(Value::String(s)) => s.split(',').map(ToString::to_string).collect(),
        Some(other) => return Err(format!("Invalid mevzuat_turleri: {other}")),
    };

    let types = names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            LegislationType::from_name(name)
                .ok_or_else(|| format!("Invalid mevzuat_turleri entry: {}", name.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((!types.is_empty()).then_some(types))
}

/// Reads a positive page argument, falling back to `default` when the value
/// is absent, not an integer, or below 1.
fn page_arg(arguments: &Map<String, Value>, key: &str, default: u32) -> u32 {
    let parsed = match arguments.get(key) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| *n >= 1)
        .map_or(default, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legislation::testing::{document, Call, StubClient};

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn search_uses_defaults_without_arguments() {
        let client = StubClient::default();
        let output = execute(&client, ToolName::SearchDocuments, &Map::new())
            .await
            .unwrap();

        let calls = client.calls();
        let [Call::Search(criteria)] = calls.as_slice() else {
            panic!("expected one search call, got {calls:?}");
        };
        assert_eq!(criteria.page_number, 1);
        assert_eq!(criteria.page_size, 5);
        assert_eq!(criteria.phrase, None);
        assert_eq!(criteria.mevzuat_no, None);

        let content = output.into_content();
        assert_eq!(content["documents"], json!([]));
        assert_eq!(content["error_message"], NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn search_coerces_page_arguments() {
        let client = StubClient::with_documents(vec![document("1", "Türk Ceza Kanunu")]);
        let output = execute(
            &client,
            ToolName::SearchDocuments,
            &args(json!({
                "phrase": "ceza",
                "mevzuat_no": 5237,
                "page_number": "3",
                "page_size": 500
            })),
        )
        .await
        .unwrap();

        let Call::Search(criteria) = &client.calls()[0] else {
            panic!("expected search call");
        };
        assert_eq!(criteria.phrase.as_deref(), Some("ceza"));
        assert_eq!(criteria.mevzuat_no.as_deref(), Some("5237"));
        assert_eq!(criteria.page_number, 3);
        assert_eq!(criteria.page_size, MAX_PAGE_SIZE);

        let content = output.into_content();
        assert_eq!(content["documents"][0]["mevzuat_adi"], "Türk Ceza Kanunu");
        assert_eq!(content["total_results"], 1);
        assert_eq!(content["error_message"], Value::Null);
    }

    #[test]
    fn page_argument_falls_back_to_default() {
        let arguments = args(json!({"a": 0, "b": "x", "c": -4, "d": 2.5, "e": null}));
        for key in ["a", "b", "c", "d", "e", "missing"] {
            assert_eq!(page_arg(&arguments, key, 7), 7, "key {key}");
        }
    }

    #[tokio::test]
    async fn article_tree_requires_id_without_backend_call() {
        let client = StubClient::default();
        let output = execute(&client, ToolName::GetArticleTree, &Map::new())
            .await
            .unwrap();

        assert_eq!(
            output.into_content(),
            json!({"error": "mevzuat_id is required"})
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn article_tree_wraps_nodes() {
        let client = StubClient::default();
        let output = execute(
            &client,
            ToolName::GetArticleTree,
            &args(json!({"mevzuat_id": "1234"})),
        )
        .await
        .unwrap();

        assert_eq!(client.calls(), vec![Call::ArticleTree("1234".to_string())]);
        let content = output.into_content();
        assert_eq!(content["nodes"][0]["madde_id"], "m1");
        assert_eq!(content["nodes"][0]["children"], json!([]));
    }

    #[tokio::test]
    async fn article_content_is_flattened() {
        let client = StubClient::default();
        let output = execute(
            &client,
            ToolName::GetArticleContent,
            &args(json!({"mevzuat_id": "1234", "madde_id": "99"})),
        )
        .await
        .unwrap();

        assert_eq!(
            output.into_content(),
            json!({
                "mevzuat_id": "1234",
                "madde_id": "99",
                "content": "<p>Madde 1</p>",
                "mime_type": "text/html"
            })
        );
    }

    #[tokio::test]
    async fn article_content_with_document_id_fetches_document() {
        let client = StubClient::default();
        let output = execute(
            &client,
            ToolName::GetArticleContent,
            &args(json!({"mevzuat_id": "1234", "madde_id": "1234"})),
        )
        .await
        .unwrap();

        assert_eq!(
            client.calls(),
            vec![Call::DocumentContent("1234".to_string())]
        );
        assert_eq!(output.into_content()["content"], "<p>Tam metin</p>");
    }

    #[tokio::test]
    async fn article_content_reports_both_missing_fields() {
        let client = StubClient::default();
        let output = execute(&client, ToolName::GetArticleContent, &Map::new())
            .await
            .unwrap();

        assert_eq!(
            output,
            ToolOutput::SoftError("mevzuat_id and madde_id are required".to_string())
        );
    }

    #[tokio::test]
    async fn unusable_article_id_reports_same_message_as_absent_one() {
        let client = StubClient::default();
        for arguments in [
            json!({"mevzuat_id": "1234"}),
            json!({"mevzuat_id": "1234", "madde_id": "   "}),
            json!({"mevzuat_id": "1234", "madde_id": true}),
        ] {
            let output = execute(&client, ToolName::GetArticleContent, &args(arguments.clone()))
                .await
                .unwrap();
            assert_eq!(
                output,
                ToolOutput::SoftError("madde_id is required".to_string()),
                "arguments {arguments}"
            );
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn search_passes_type_and_sort_arguments() {
        let client = StubClient::default();
        execute(
            &client,
            ToolName::SearchDocuments,
            &args(json!({
                "phrase": "vergi",
                "mevzuat_turleri": ["KANUN", "khk"],
                "sort_field": "MEVZUAT_NUMARASI",
                "sort_direction": "asc"
            })),
        )
        .await
        .unwrap();

        let Call::Search(criteria) = &client.calls()[0] else {
            panic!("expected search call");
        };
        assert_eq!(criteria.types, vec![LegislationType::Kanun, LegislationType::Khk]);
        assert_eq!(criteria.sort_field, SortField::MevzuatNumarasi);
        assert_eq!(criteria.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn type_filter_accepts_encoded_lists() {
        let encoded = args(json!({"mevzuat_turleri": "[\"YONETMELIK\"]"}));
        assert_eq!(
            types_arg(&encoded),
            Ok(Some(vec![LegislationType::Yonetmelik]))
        );

        let comma = args(json!({"mevzuat_turleri": "KANUN, TUZUK"}));
        assert_eq!(
            types_arg(&comma),
            Ok(Some(vec![LegislationType::Kanun, LegislationType::Tuzuk]))
        );

        let empty = args(json!({"mevzuat_turleri": []}));
        assert_eq!(types_arg(&empty), Ok(None));
    }

    #[tokio::test]
    async fn search_rejects_unknown_enumerated_values() {
        let client = StubClient::default();
        for (arguments, message) in [
            (json!({"sort_field": "TITLE"}), "Invalid sort_field: TITLE"),
            (json!({"sort_direction": 1}), "Invalid sort_direction: 1"),
            (
                json!({"mevzuat_turleri": ["KANUN", "GENELGE"]}),
                "Invalid mevzuat_turleri entry: GENELGE",
            ),
        ] {
            let output = execute(&client, ToolName::SearchDocuments, &args(arguments))
                .await
                .unwrap();
            assert_eq!(output, ToolOutput::SoftError(message.to_string()));
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn search_defaults_sort_and_types() {
        let client = StubClient::default();
        execute(
            &client,
            ToolName::SearchDocuments,
            &args(json!({"sort_field": "", "mevzuat_turleri": null})),
        )
        .await
        .unwrap();

        let Call::Search(criteria) = &client.calls()[0] else {
            panic!("expected search call");
        };
        assert_eq!(*criteria, SearchCriteria::default());
    }

    #[tokio::test]
    async fn backend_failure_is_soft_error() {
        let client = StubClient::failing("service unavailable");
        let output = execute(
            &client,
            ToolName::GetDocumentContent,
            &args(json!({"mevzuat_id": "1234"})),
        )
        .await
        .unwrap();

        assert!(matches!(output, ToolOutput::SoftError(_)));
        assert_eq!(
            output.into_content(),
            json!({"error": "Upstream error: service unavailable"})
        );
    }
}
