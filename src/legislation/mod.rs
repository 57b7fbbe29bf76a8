//! Access to the upstream Turkish legislation source.
//!
//! The MCP dispatcher only depends on the [`LegislationClient`] trait. The
//! production implementation, [`MevzuatClient`], talks JSON over HTTPS to the
//! Ministry of Justice document service behind mevzuat.gov.tr.
//!
//! # Operations
//!
//! | Operation | Returns |
//! |---|---|
//! | [`LegislationClient::search`] | One page of matching documents |
//! | [`LegislationClient::article_tree`] | Hierarchical table of contents |
//! | [`LegislationClient::article_content`] | Content of one article |
//! | [`LegislationClient::document_content`] | Content of a whole document |

pub mod error;
pub mod http;
pub mod models;

pub use error::{ClientError, ClientResult};
pub use http::{MevzuatClient, MevzuatClientConfig, DEFAULT_BASE_URL};
pub use models::{
    ArticleContent, ArticleNode, Document, DocumentContent, LegislationType, SearchCriteria,
    SearchResult, SortDirection, SortField,
};

use async_trait::async_trait;

/// Retrieval operations against the legislation source.
///
/// Implementations must be safe to share between concurrently running
/// requests; the server holds a single instance behind an `Arc`.
#[async_trait]
pub trait LegislationClient: Send + Sync {
    /// Searches for documents matching `criteria`.
    async fn search(&self, criteria: &SearchCriteria) -> ClientResult<SearchResult>;

    /// Fetches the table of contents of a document.
    ///
    /// An empty tree means the document has no hierarchical structure.
    async fn article_tree(&self, mevzuat_id: &str) -> ClientResult<Vec<ArticleNode>>;

    /// Fetches the content of a single article.
    async fn article_content(&self, mevzuat_id: &str, madde_id: &str)
        -> ClientResult<ArticleContent>;

    /// Fetches the content of a whole document.
    async fn document_content(&self, mevzuat_id: &str) -> ClientResult<DocumentContent>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`LegislationClient`] that records every call.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{
        ArticleContent, ArticleNode, ClientError, ClientResult, Document, DocumentContent,
        LegislationClient, SearchCriteria, SearchResult,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Search(SearchCriteria),
        ArticleTree(String),
        ArticleContent(String, String),
        DocumentContent(String),
    }

    #[derive(Debug, Default)]
    pub struct StubClient {
        pub calls: Mutex<Vec<Call>>,
        pub documents: Vec<Document>,
        pub failure: Option<String>,
    }

    impl StubClient {
        pub fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn with_documents(documents: Vec<Document>) -> Self {
            Self {
                documents,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> ClientResult<()> {
            self.calls.lock().unwrap().push(call);
            match &self.failure {
                Some(message) => Err(ClientError::upstream(message.clone())),
                None => Ok(()),
            }
        }
    }

    pub fn document(id: &str, title: &str) -> Document {
        Document {
            mevzuat_id: id.to_string(),
            mevzuat_no: Some("5237".to_string()),
            mevzuat_adi: title.to_string(),
            mevzuat_tur: Some("KANUN".to_string()),
            resmi_gazete_tarihi: Some("2004-10-12".to_string()),
            resmi_gazete_sayisi: Some("25611".to_string()),
            url: None,
        }
    }

    #[async_trait]
    impl LegislationClient for StubClient {
        async fn search(&self, criteria: &SearchCriteria) -> ClientResult<SearchResult> {
            self.record(Call::Search(criteria.clone()))?;
            Ok(SearchResult::new(
                self.documents.clone(),
                self.documents.len() as u64,
                criteria.page_number,
                criteria.page_size,
            ))
        }

        async fn article_tree(&self, mevzuat_id: &str) -> ClientResult<Vec<ArticleNode>> {
            self.record(Call::ArticleTree(mevzuat_id.to_string()))?;
            Ok(vec![ArticleNode {
                madde_id: "m1".to_string(),
                madde_no: Some("1".to_string()),
                title: "Amaç".to_string(),
                description: None,
                children: Vec::new(),
            }])
        }

        async fn article_content(
            &self,
            mevzuat_id: &str,
            madde_id: &str,
        ) -> ClientResult<ArticleContent> {
            self.record(Call::ArticleContent(
                mevzuat_id.to_string(),
                madde_id.to_string(),
            ))?;
            Ok(ArticleContent {
                mevzuat_id: mevzuat_id.to_string(),
                madde_id: madde_id.to_string(),
                content: "<p>Madde 1</p>".to_string(),
                mime_type: "text/html".to_string(),
            })
        }

        async fn document_content(&self, mevzuat_id: &str) -> ClientResult<DocumentContent> {
            self.record(Call::DocumentContent(mevzuat_id.to_string()))?;
            Ok(DocumentContent {
                mevzuat_id: mevzuat_id.to_string(),
                content: "<p>Tam metin</p>".to_string(),
                mime_type: "text/html".to_string(),
            })
        }
    }
}
