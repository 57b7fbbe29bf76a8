//! Domain types returned by the legislation client.
//!
//! These are the shapes the tool adapters flatten into plain JSON mappings.
//! Wire-level request/response types for the upstream API live in
//! [`super::http`] and never leave that module.

use serde::Serialize;

/// Legislation categories understood by the upstream search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegislationType {
    /// Kanun (statute).
    Kanun,
    /// Cumhurbaşkanlığı kararnamesi (presidential decree).
    CbKararname,
    /// Yönetmelik (regulation).
    Yonetmelik,
    /// Cumhurbaşkanlığı yönetmeliği (presidential regulation).
    CbYonetmelik,
    /// Cumhurbaşkanı kararı (presidential decision).
    CbKarar,
    /// Cumhurbaşkanlığı genelgesi (presidential circular).
    CbGenelge,
    /// Kanun hükmünde kararname (decree-law).
    Khk,
    /// Tüzük (bylaw).
    Tuzuk,
    /// Kurum ve kuruluş yönetmeliği (institutional regulation).
    Kky,
    /// Üniversite yönetmeliği (university regulation).
    Uy,
    /// Tebliğler (communiqués).
    Tebligler,
    /// Repealed legislation.
    Mulga,
}

impl LegislationType {
    /// Every category, in the order the upstream lists them.
    pub const ALL: [Self; 12] = [
        Self::Kanun,
        Self::CbKararname,
        Self::Yonetmelik,
        Self::CbYonetmelik,
        Self::CbKarar,
        Self::CbGenelge,
        Self::Khk,
        Self::Tuzuk,
        Self::Kky,
        Self::Uy,
        Self::Tebligler,
        Self::Mulga,
    ];

    /// Upstream wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kanun => "KANUN",
            Self::CbKararname => "CB_KARARNAME",
            Self::Yonetmelik => "YONETMELIK",
            Self::CbYonetmelik => "CB_YONETMELIK",
            Self::CbKarar => "CB_KARAR",
            Self::CbGenelge => "CB_GENELGE",
            Self::Khk => "KHK",
            Self::Tuzuk => "TUZUK",
            Self::Kky => "KKY",
            Self::Uy => "UY",
            Self::Tebligler => "TEBLIGLER",
            Self::Mulga => "MULGA",
        }
    }

    /// Parses a wire name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

/// Field used to order search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    /// Official Gazette publication date.
    #[default]
    ResmiGazeteTarihi,
    /// Registration date.
    KayitTarihi,
    /// Legislation number.
    MevzuatNumarasi,
}

impl SortField {
    /// Every sort field.
    pub const ALL: [Self; 3] = [
        Self::ResmiGazeteTarihi,
        Self::KayitTarihi,
        Self::MevzuatNumarasi,
    ];

    /// Upstream wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResmiGazeteTarihi => "RESMI_GAZETE_TARIHI",
            Self::KayitTarihi => "KAYIT_TARIHI",
            Self::MevzuatNumarasi => "MEVZUAT_NUMARASI",
        }
    }

    /// Parses a wire name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

/// Sort direction for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    /// Upstream wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parses `asc` or `desc`, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Criteria for a legislation search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Full-text search phrase.
    pub phrase: Option<String>,
    /// Legislation number, e.g. `5237`.
    pub mevzuat_no: Option<String>,
    /// Categories to search in.
    pub types: Vec<LegislationType>,
    /// 1-based page number.
    pub page_number: u32,
    /// Results per page.
    pub page_size: u32,
    /// Sort field.
    pub sort_field: SortField,
    /// Sort direction.
    pub sort_direction: SortDirection,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            phrase: None,
            mevzuat_no: None,
            types: LegislationType::ALL.to_vec(),
            page_number: 1,
            page_size: 5,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

/// A single legislation document in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Upstream document identifier.
    pub mevzuat_id: String,
    /// Legislation number.
    pub mevzuat_no: Option<String>,
    /// Title.
    pub mevzuat_adi: String,
    /// Category name.
    pub mevzuat_tur: Option<String>,
    /// Official Gazette publication date.
    pub resmi_gazete_tarihi: Option<String>,
    /// Official Gazette issue number.
    pub resmi_gazete_sayisi: Option<String>,
    /// Link to the document on mevzuat.gov.tr.
    pub url: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Documents on this page.
    pub documents: Vec<Document>,
    /// Total number of matches across all pages.
    pub total_results: u64,
    /// 1-based page number.
    pub current_page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of pages.
    pub total_pages: u64,
    /// Informational message when the search produced no usable result.
    pub error_message: Option<String>,
}

impl SearchResult {
    /// Builds a result page, deriving the page count from the totals.
    #[must_use]
    pub fn new(
        documents: Vec<Document>,
        total_results: u64,
        current_page: u32,
        page_size: u32,
    ) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_results.div_ceil(u64::from(page_size))
        };
        Self {
            documents,
            total_results,
            current_page,
            page_size,
            total_pages,
            error_message: None,
        }
    }
}

/// A node in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleNode {
    /// Identifier usable as `madde_id` for article content requests.
    pub madde_id: String,
    /// Article number, if the node is an article.
    pub madde_no: Option<String>,
    /// Heading text.
    pub title: String,
    /// Additional heading text.
    pub description: Option<String>,
    /// Nested sections and articles.
    pub children: Vec<ArticleNode>,
}

/// Rendered content of a single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleContent {
    /// Parent document identifier.
    pub mevzuat_id: String,
    /// Article identifier.
    pub madde_id: String,
    /// Decoded content.
    pub content: String,
    /// MIME type reported by the upstream.
    pub mime_type: String,
}

/// Rendered content of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentContent {
    /// Document identifier.
    pub mevzuat_id: String,
    /// Decoded content.
    pub content: String,
    /// MIME type reported by the upstream.
    pub mime_type: String,
}
