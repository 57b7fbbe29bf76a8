//! HTTP implementation of [`LegislationClient`].
//!
//! Every upstream endpoint is a `POST` taking a `{"data": ..., "applicationName":
//! ...}` envelope and answering with `{"data": ..., "metadata": {"FMTY": ...}}`.
//! Document bodies arrive base64-encoded.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::{ClientError, ClientResult};
use super::models::{
    ArticleContent, ArticleNode, Document, DocumentContent, LegislationType, SearchCriteria,
    SearchResult, SortDirection, SortField,
};
use super::LegislationClient;

/// Default base URL of the upstream document service.
pub const DEFAULT_BASE_URL: &str = "https://bedesten.adalet.gov.tr/mevzuat";

/// Application name the upstream expects in every request envelope.
const APPLICATION_NAME: &str = "UyapMevzuat";

const SEARCH_ENDPOINT: &str = "searchDocuments";
const TREE_ENDPOINT: &str = "mevzuatMaddeTree";
const CONTENT_ENDPOINT: &str = "getDocumentContent";

/// Configuration for [`MevzuatClient`].
#[derive(Debug, Clone)]
pub struct MevzuatClientConfig {
    /// Base URL without trailing endpoint names.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for MevzuatClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the upstream legislation API.
///
/// Holds a pooled `reqwest::Client`; connections are released when the
/// client is dropped.
#[derive(Debug, Clone)]
pub struct MevzuatClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl MevzuatClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example when the TLS backend fails to initialise).
    pub fn new(config: MevzuatClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("mevzuat-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Http {
                endpoint: "client",
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts an envelope to `endpoint` and unwraps the `data` member of the reply.
    async fn post<B, T>(
        &self,
        endpoint: &'static str,
        envelope: &RequestEnvelope<B>,
    ) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(endpoint, "Sending upstream request");

        let response = self
            .http
            .post(&url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let envelope: ResponseEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ClientError::invalid_response(endpoint, e.to_string()))?;

        envelope.into_data(endpoint)
    }

    fn transport_error(&self, endpoint: &'static str, source: reqwest::Error) -> ClientError {
        if source.is_timeout() {
            ClientError::Timeout {
                endpoint,
                timeout_secs: self.timeout_secs,
            }
        } else {
            ClientError::Http { endpoint, source }
        }
    }

    /// Fetches and decodes a document body by upstream id and kind.
    async fn fetch_content(&self, id: &str, kind: DocumentKind) -> ClientResult<(String, String)> {
        let envelope = RequestEnvelope::new(ContentRequestData {
            id,
            document_type: kind,
        });
        let data: ContentResponseData = self.post(CONTENT_ENDPOINT, &envelope).await?;
        let content = decode_content(&data.content)?;
        Ok((content, data.mime_type))
    }
}

#[async_trait]
impl LegislationClient for MevzuatClient {
    async fn search(&self, criteria: &SearchCriteria) -> ClientResult<SearchResult> {
        let envelope = RequestEnvelope::paged(SearchRequestData {
            page_size: criteria.page_size,
            page_number: criteria.page_number,
            mevzuat_tur_list: &criteria.types,
            sort_fields: [criteria.sort_field],
            sort_direction: criteria.sort_direction,
            phrase: criteria.phrase.as_deref(),
            mevzuat_no: criteria.mevzuat_no.as_deref(),
        });
        let data: SearchResponseData = self.post(SEARCH_ENDPOINT, &envelope).await?;

        let documents = data.mevzuat_list.into_iter().map(Document::from).collect();
        Ok(SearchResult::new(
            documents,
            data.total,
            criteria.page_number,
            criteria.page_size,
        ))
    }

    async fn article_tree(&self, mevzuat_id: &str) -> ClientResult<Vec<ArticleNode>> {
        let envelope = RequestEnvelope::new(TreeRequestData { mevzuat_id });
        let data: TreeResponseData = self.post(TREE_ENDPOINT, &envelope).await?;
        Ok(data.children.into_iter().map(ArticleNode::from).collect())
    }

    async fn article_content(
        &self,
        mevzuat_id: &str,
        madde_id: &str,
    ) -> ClientResult<ArticleContent> {
        let (content, mime_type) = self.fetch_content(madde_id, DocumentKind::Madde).await?;
        Ok(ArticleContent {
            mevzuat_id: mevzuat_id.to_string(),
            madde_id: madde_id.to_string(),
            content,
            mime_type,
        })
    }

    async fn document_content(&self, mevzuat_id: &str) -> ClientResult<DocumentContent> {
        let (content, mime_type) = self.fetch_content(mevzuat_id, DocumentKind::Mevzuat).await?;
        Ok(DocumentContent {
            mevzuat_id: mevzuat_id.to_string(),
            content,
            mime_type,
        })
    }
}

/// Decodes a base64 document body into text.
fn decode_content(encoded: &str) -> ClientResult<String> {
    let bytes = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| ClientError::invalid_response(CONTENT_ENDPOINT, format!("bad base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ClientError::invalid_response(CONTENT_ENDPOINT, format!("bad UTF-8: {e}")))
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestEnvelope<T> {
    data: T,
    application_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    paging: Option<bool>,
}

impl<T> RequestEnvelope<T> {
    const fn new(data: T) -> Self {
        Self {
            data,
            application_name: APPLICATION_NAME,
            paging: None,
        }
    }

    const fn paged(data: T) -> Self {
        Self {
            data,
            application_name: APPLICATION_NAME,
            paging: Some(true),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequestData<'a> {
    page_size: u32,
    page_number: u32,
    mevzuat_tur_list: &'a [LegislationType],
    sort_fields: [SortField; 1],
    sort_direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    phrase: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mevzuat_no: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeRequestData<'a> {
    mevzuat_id: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum DocumentKind {
    Madde,
    Mevzuat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequestData<'a> {
    id: &'a str,
    document_type: DocumentKind,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(rename = "FMTY", default)]
    status: Option<String>,
    #[serde(rename = "FMTE", default)]
    message: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    fn into_data(self, endpoint: &'static str) -> ClientResult<T> {
        if let Some(ResponseMetadata {
            status: Some(status),
            message,
        }) = self.metadata
        {
            if status != "SUCCESS" {
                return Err(ClientError::upstream(message.unwrap_or(status)));
            }
        }
        self.data
            .ok_or_else(|| ClientError::invalid_response(endpoint, "missing data member"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponseData {
    #[serde(default)]
    mevzuat_list: Vec<DocumentWire>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentWire {
    #[serde(deserialize_with = "required_id")]
    mevzuat_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    mevzuat_no: Option<String>,
    #[serde(default)]
    mevzuat_adi: String,
    #[serde(default)]
    mevzuat_tur: Option<MevzuatTurWire>,
    #[serde(default, deserialize_with = "optional_text")]
    resmi_gazete_tarihi: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    resmi_gazete_sayisi: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MevzuatTurWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<DocumentWire> for Document {
    fn from(wire: DocumentWire) -> Self {
        Self {
            mevzuat_id: wire.mevzuat_id,
            mevzuat_no: wire.mevzuat_no,
            mevzuat_adi: wire.mevzuat_adi,
            mevzuat_tur: wire.mevzuat_tur.and_then(|t| t.description.or(t.name)),
            resmi_gazete_tarihi: wire.resmi_gazete_tarihi,
            resmi_gazete_sayisi: wire.resmi_gazete_sayisi,
            url: wire.url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponseData {
    #[serde(default)]
    children: Vec<TreeNodeWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeNodeWire {
    #[serde(deserialize_with = "required_id")]
    madde_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    madde_no: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    children: Vec<TreeNodeWire>,
}

impl From<TreeNodeWire> for ArticleNode {
    fn from(wire: TreeNodeWire) -> Self {
        Self {
            madde_id: wire.madde_id,
            madde_no: wire.madde_no,
            title: wire.title,
            description: wire.description,
            children: wire.children.into_iter().map(Self::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponseData {
    content: String,
    #[serde(default = "default_mime_type")]
    mime_type: String,
}

fn default_mime_type() -> String {
    "text/html".to_string()
}

/// Identifiers come back as either strings or numbers.
fn required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing identifier"))
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
