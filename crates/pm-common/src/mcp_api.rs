use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTopicsParams {
    /// Optional case-insensitive substring filter, e.g. "risk".
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompareTopicParams {
    /// Comparison topic such as "Risk Management" or "Quality Management".
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchStandardsParams {
    /// Text to look for in standard metadata and section titles/bodies.
    pub term: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListStandardsParams {
    /// Optional filter matched against title, version, publisher and slug.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableOfContentsParams {
    /// Standard slug such as "pmbok7".
    pub standard: String,
    /// Section ids whose children should be listed.
    pub expanded: Option<Vec<String>>,
    /// List every level regardless of `expanded` (default: false).
    pub expand_all: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetSectionParams {
    /// Standard slug such as "prince2".
    pub standard: String,
    /// Section id within that standard, e.g. "4.8".
    pub section_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ToggleBookmarkParams {
    /// Standard slug to bookmark.
    pub standard: String,
    /// Section id; omit to bookmark the whole standard.
    pub section_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DownloadLinkParams {
    /// Standard slug such as "iso21500".
    pub standard: String,
    /// "pdf", "epub" or "html" (default: "pdf").
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopicListResponse {
    pub topics: Vec<String>,
    /// Size of the unfiltered topic catalogue.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Standard,
    Section,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHitInfo {
    pub kind: HitKind,
    pub standard_slug: String,
    pub standard_title: String,
    pub section_id: Option<String>,
    pub section_title: Option<String>,
    /// Titles from the top-level section down to the matched section.
    pub path: Vec<String>,
    /// Fields that contained the term ("title", "text", "version", "publisher").
    pub matched_fields: Vec<String>,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchStandardsResponse {
    pub term: String,
    pub hits: Vec<SearchHitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StandardSummary {
    pub slug: String,
    pub title: String,
    pub version: String,
    pub publisher: Option<String>,
    pub year: Option<String>,
    pub section_count: usize,
    /// At most the first three key concepts.
    pub key_concepts: Vec<String>,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StandardListResponse {
    pub standards: Vec<StandardSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TocEntryInfo {
    pub id: String,
    /// True when `id` is a positional `S<n>` stand-in; such entries cannot be opened
    /// with get_section or bookmarked.
    pub id_is_placeholder: bool,
    pub title: String,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableOfContentsResponse {
    pub standard: String,
    pub entries: Vec<TocEntryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubsectionPreview {
    pub id: String,
    pub title: String,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionDetailResponse {
    pub standard: String,
    pub id: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub page: Option<String>,
    pub file_ref: Option<String>,
    pub subsections: Vec<SubsectionPreview>,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookmarkToggleResponse {
    pub bookmark_id: String,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookmarkListResponse {
    pub bookmarks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DownloadLinkResponse {
    pub standard: String,
    pub format: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReloadStandardsResponse {
    pub standard_count: usize,
    pub comparison_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessInfo {
    /// Backend record id, when the backend sent one
    pub id: Option<String>,
    pub name: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessListResponse {
    pub processes: Vec<ProcessInfo>,
}
