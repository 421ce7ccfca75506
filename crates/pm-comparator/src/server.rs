/// MCP server implementation for the PM standards comparator.
///
/// Exposes tools to:
/// - `list_topics` / `compare_topic`: side-by-side comparison of PMBOK, PRINCE2 and ISO 21500
/// - `search_standards`, `list_standards`, `table_of_contents`, `get_section`: reading
/// - `toggle_bookmark` / `list_bookmarks`: persistent bookmarks
/// - `download_link`: official publisher links
/// - `list_processes`: tailored process recommendations
/// - `reload_standards`: refetch the catalog after a backend failure
use std::collections::HashSet;
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::bookmarks::{bookmark_id, BookmarkStore};
use crate::catalog::{self, CatalogState};
use crate::comparison::{self, ComparisonResult};
use crate::error::AppError;
use crate::finder::{self, SearchHit};
use crate::knowledge::KnowledgeBase;
use crate::model::{preview, Standard};
use crate::toc::{self, Expansion};
use pm_common::http::StandardsApiClient;
use pm_common::mcp_api::{
    BookmarkListResponse, BookmarkToggleResponse, CompareTopicParams, DownloadLinkParams,
    DownloadLinkResponse, GetSectionParams, HitKind, ListStandardsParams, ListTopicsParams,
    ProcessInfo, ProcessListResponse,
    ReloadStandardsResponse, SearchHitInfo, SearchStandardsParams, SearchStandardsResponse,
    SectionDetailResponse, StandardListResponse, StandardSummary, SubsectionPreview,
    TableOfContentsParams, TableOfContentsResponse, TocEntryInfo, ToggleBookmarkParams,
    TopicListResponse,
};
use pm_common::redis::RedisStore;

const SEARCH_PREVIEW_CHARS: usize = 200;
const SUBSECTION_PREVIEW_CHARS: usize = 150;
const SUMMARY_KEY_CONCEPTS: usize = 3;

#[derive(Clone)]
pub struct ComparatorServer {
    catalog: Arc<RwLock<CatalogState>>,
    knowledge: Arc<KnowledgeBase>,
    bookmarks: Arc<Mutex<BookmarkStore<RedisStore>>>,
    client: Arc<StandardsApiClient>,
    tool_router: ToolRouter<ComparatorServer>,
}

impl ComparatorServer {
    pub fn new(
        catalog: CatalogState,
        knowledge: KnowledgeBase,
        bookmarks: BookmarkStore<RedisStore>,
        client: StandardsApiClient,
    ) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            knowledge: Arc::new(knowledge),
            bookmarks: Arc::new(Mutex::new(bookmarks)),
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ComparatorServer {
    #[tool(description = "List the comparison topics (e.g. 'Risk Management'), optionally filtered by a case-insensitive substring.")]
    async fn list_topics(
        &self,
        Parameters(params): Parameters<ListTopicsParams>,
    ) -> Result<Json<TopicListResponse>, String> {
        let filter = params.filter.unwrap_or_default();
        let topics = self
            .knowledge
            .filter_topics(filter.trim())
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Json(TopicListResponse {
            topics,
            total: self.knowledge.topics().len(),
        }))
    }

    #[tool(description = "Compare PMBOK 7, PRINCE2 and ISO 21500 on a topic. Returns relevant sections per standard (curated sections score 90), each standard's approach and focus, insights and recommendations.")]
    async fn compare_topic(
        &self,
        Parameters(params): Parameters<CompareTopicParams>,
    ) -> Result<Json<ComparisonResult>, String> {
        let topic = non_empty(&params.topic, "topic")?;

        let state = self.catalog.read().await;
        let catalog = state.ready()?;
        let result = comparison::generate_comparison(&topic, &catalog.standards, &self.knowledge);
        info!(
            topic = %topic,
            sections = result.standards.values().map(|s| s.sections.len()).sum::<usize>(),
            "comparison generated"
        );
        Ok(Json(result))
    }

    #[tool(description = "Full-text search over standard metadata and every section title and body. Section hits include the breadcrumb path of section titles.")]
    async fn search_standards(
        &self,
        Parameters(params): Parameters<SearchStandardsParams>,
    ) -> Result<Json<SearchStandardsResponse>, String> {
        let term = non_empty(&params.term, "term")?;

        let state = self.catalog.read().await;
        let catalog = state.ready()?;
        let hits = finder::search_standards(&catalog.standards, &term)
            .into_iter()
            .map(to_api_hit)
            .collect();

        Ok(Json(SearchStandardsResponse { term, hits }))
    }

    #[tool(description = "List the loaded standards with version, publisher, section count and key concepts. Optional filter matches title, version, publisher or slug.")]
    async fn list_standards(
        &self,
        Parameters(params): Parameters<ListStandardsParams>,
    ) -> Result<Json<StandardListResponse>, String> {
        let needle = params.filter.unwrap_or_default().trim().to_lowercase();

        let state = self.catalog.read().await;
        let catalog = state.ready()?;
        let bookmarks = self.bookmarks.lock().await;

        let standards = catalog
            .standards
            .iter()
            .filter(|s| needle.is_empty() || standard_matches(s, &needle))
            .map(|s| StandardSummary {
                slug: s.slug.clone(),
                title: s.title_or_default().to_string(),
                version: s.version.clone().unwrap_or_else(|| "N/A".to_string()),
                publisher: s.publisher().map(str::to_string),
                year: s
                    .meta
                    .as_ref()
                    .and_then(|m| m.year.as_ref())
                    .map(|y| y.to_string()),
                section_count: s.sections.len(),
                key_concepts: s
                    .meta
                    .as_ref()
                    .map(|m| m.key_concepts.iter().take(SUMMARY_KEY_CONCEPTS).cloned().collect())
                    .unwrap_or_default(),
                bookmarked: bookmarks.has(&s.slug),
            })
            .collect();

        Ok(Json(StandardListResponse {
            standards,
            total: catalog.standards.len(),
        }))
    }

    #[tool(description = "Table of contents of a standard. Children are listed under the section ids given in 'expanded', or everywhere with expand_all.")]
    async fn table_of_contents(
        &self,
        Parameters(params): Parameters<TableOfContentsParams>,
    ) -> Result<Json<TableOfContentsResponse>, String> {
        let slug = non_empty(&params.standard, "standard")?;
        let expanded: HashSet<String> = params.expanded.unwrap_or_default().into_iter().collect();
        let expansion = if params.expand_all.unwrap_or(false) {
            Expansion::All
        } else {
            Expansion::Only(&expanded)
        };

        let state = self.catalog.read().await;
        let catalog = state.ready()?;
        let standard = catalog
            .standard(&slug)
            .ok_or_else(|| AppError::StandardNotFound(slug.clone()).to_string())?;
        let bookmarks = self.bookmarks.lock().await;

        let entries = toc::flatten(&standard.sections, expansion)
            .into_iter()
            .map(|entry| TocEntryInfo {
                bookmarked: !entry.id_is_placeholder
                    && bookmarks.has(&bookmark_id(&slug, Some(&entry.id))),
                id: entry.id,
                id_is_placeholder: entry.id_is_placeholder,
                title: entry.title,
                level: entry.level,
                has_children: entry.has_children,
                expanded: entry.expanded,
            })
            .collect();

        Ok(Json(TableOfContentsResponse {
            standard: slug,
            entries,
        }))
    }

    #[tool(description = "Read one section of a standard: body paragraphs, page reference, downloadable file and previews of its subsections.")]
    async fn get_section(
        &self,
        Parameters(params): Parameters<GetSectionParams>,
    ) -> Result<Json<SectionDetailResponse>, String> {
        let slug = non_empty(&params.standard, "standard")?;
        let section_id = non_empty(&params.section_id, "section_id")?;

        let state = self.catalog.read().await;
        let catalog = state.ready()?;
        let standard = catalog
            .standard(&slug)
            .ok_or_else(|| AppError::StandardNotFound(slug.clone()).to_string())?;
        let section = finder::find_by_id(&standard.sections, &section_id)
            .ok_or_else(|| {
                AppError::SectionNotFound {
                    standard: slug.clone(),
                    section: section_id.clone(),
                }
                .to_string()
            })?;
        let bookmarked = self
            .bookmarks
            .lock()
            .await
            .has(&bookmark_id(&slug, Some(&section.id)));

        Ok(Json(SectionDetailResponse {
            standard: slug,
            id: section.id.clone(),
            title: section.title_str().to_string(),
            paragraphs: section.paragraphs(),
            page: section.page.as_ref().map(|p| p.to_string()),
            file_ref: section.file_ref.clone(),
            subsections: section
                .subsections
                .iter()
                .map(|sub| SubsectionPreview {
                    id: sub.id.clone(),
                    title: sub.title_str().to_string(),
                    preview: sub
                        .text
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .map(|t| preview(t, SUBSECTION_PREVIEW_CHARS)),
                })
                .collect(),
            bookmarked,
        }))
    }

    #[tool(description = "Bookmark a standard (or one of its sections by section_id), or remove the bookmark if it already exists.")]
    async fn toggle_bookmark(
        &self,
        Parameters(params): Parameters<ToggleBookmarkParams>,
    ) -> Result<Json<BookmarkToggleResponse>, String> {
        let slug = non_empty(&params.standard, "standard")?;
        let section_id = params
            .section_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let id = bookmark_id(&slug, section_id);

        let bookmarked = self.bookmarks.lock().await.toggle(&id).await;
        info!(bookmark = %id, bookmarked, "bookmark toggled");

        Ok(Json(BookmarkToggleResponse {
            bookmark_id: id,
            bookmarked,
        }))
    }

    #[tool(description = "List bookmark ids ('<standard>' or '<standard>-<sectionId>') in the order they were added.")]
    async fn list_bookmarks(&self) -> Result<Json<BookmarkListResponse>, String> {
        let bookmarks = self.bookmarks.lock().await.ids().to_vec();
        Ok(Json(BookmarkListResponse { bookmarks }))
    }

    #[tool(description = "Official publisher link for a standard in 'pdf', 'epub' or 'html' format (falls back to the pdf link).")]
    async fn download_link(
        &self,
        Parameters(params): Parameters<DownloadLinkParams>,
    ) -> Result<Json<DownloadLinkResponse>, String> {
        let slug = non_empty(&params.standard, "standard")?;
        let format = params
            .format
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or("pdf")
            .to_lowercase();

        let url = self
            .knowledge
            .download_link(&slug, &format)
            .ok_or_else(|| {
                format!("no official download link for '{slug}'; visit the publisher's website")
            })?
            .to_string();

        Ok(Json(DownloadLinkResponse {
            standard: slug,
            format,
            url,
        }))
    }

    #[tool(description = "Tailored process recommendations from the backend: each process name with its recommendation.")]
    async fn list_processes(&self) -> Result<Json<ProcessListResponse>, String> {
        let processes = catalog::load_processes(&self.client)
            .await
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|p| ProcessInfo {
                id: p.id,
                name: p.name,
                recommendation: p.recommendation,
            })
            .collect();
        Ok(Json(ProcessListResponse { processes }))
    }

    #[tool(description = "Refetch the standards and comparisons listings from the backend. Use after a load failure.")]
    async fn reload_standards(&self) -> Result<Json<ReloadStandardsResponse>, String> {
        info!("reload_standards tool invoked");

        let result = catalog::load(&self.client).await;
        let mut state = self.catalog.write().await;
        *state = CatalogState::from_result(result);

        match &*state {
            CatalogState::Ready(catalog) => Ok(Json(ReloadStandardsResponse {
                standard_count: catalog.standards.len(),
                comparison_count: catalog.comparison_count(),
            })),
            CatalogState::Failed(message) => {
                warn!(error = %message, "reload failed");
                Err(message.clone())
            }
        }
    }
}

fn non_empty(value: &str, name: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{name} must not be empty"));
    }
    Ok(value.to_string())
}

fn standard_matches(standard: &Standard, needle: &str) -> bool {
    [
        standard.title.as_deref(),
        standard.version.as_deref(),
        standard.publisher(),
        Some(standard.slug.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|v| v.to_lowercase().contains(needle))
}

fn to_api_hit(hit: SearchHit<'_>) -> SearchHitInfo {
    match hit {
        SearchHit::Standard { standard, matches } => SearchHitInfo {
            kind: HitKind::Standard,
            standard_slug: standard.slug.clone(),
            standard_title: standard.title_or_default().to_string(),
            section_id: None,
            section_title: None,
            path: Vec::new(),
            matched_fields: matches.iter().map(|m| m.as_str().to_string()).collect(),
            preview: None,
        },
        SearchHit::Section {
            standard,
            section,
            path,
            matches,
        } => {
            let mut matched_fields = Vec::new();
            if matches.title {
                matched_fields.push("title".to_string());
            }
            if matches.text {
                matched_fields.push("text".to_string());
            }
            SearchHitInfo {
                kind: HitKind::Section,
                standard_slug: standard.slug.clone(),
                standard_title: standard.title_or_default().to_string(),
                section_id: Some(section.id.clone()),
                section_title: section.title.clone(),
                path: path.into_iter().map(str::to_string).collect(),
                matched_fields,
                preview: section
                    .text
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(|t| preview(t, SEARCH_PREVIEW_CHARS)),
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for ComparatorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pm-comparator".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Project management standards comparator. Use list_topics and compare_topic to \
                 compare PMBOK 7, PRINCE2 and ISO 21500 on a topic, search_standards for \
                 full-text search, list_standards/table_of_contents/get_section to read a \
                 standard, toggle_bookmark/list_bookmarks for bookmarks, and reload_standards \
                 if the backend was unavailable."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::DEFAULT_STORAGE_KEY;
    use crate::catalog::Catalog;
    use crate::finder::{MetaField, SectionMatches};
    use crate::model::fixtures::{catalog as fixture_catalog, section, standard};
    use pm_common::http::StandardsApiConfig;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = ComparatorServer::tool_router().list_all();
        for name in [
            "list_topics",
            "compare_topic",
            "search_standards",
            "list_standards",
            "table_of_contents",
            "get_section",
            "toggle_bookmark",
            "list_bookmarks",
            "download_link",
            "list_processes",
            "reload_standards",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    async fn test_server() -> ComparatorServer {
        server_with(fixture_catalog()).await
    }

    async fn server_with(standards: Vec<Standard>) -> ComparatorServer {
        let client = StandardsApiClient::new(StandardsApiConfig::new(
            "http://127.0.0.1:9",
            std::time::Duration::from_millis(200),
            1024,
        ))
        .unwrap();
        let bookmarks = BookmarkStore::open(RedisStore::disabled(), DEFAULT_STORAGE_KEY).await;
        ComparatorServer::new(
            CatalogState::Ready(Catalog {
                standards,
                comparisons: serde_json::Value::Null,
            }),
            KnowledgeBase::embedded().unwrap(),
            bookmarks,
            client,
        )
    }

    #[tokio::test]
    async fn compare_topic_rejects_blank_topic() {
        let server = test_server().await;
        let Err(err) = server
            .compare_topic(Parameters(CompareTopicParams {
                topic: "   ".to_string(),
            }))
            .await
        else {
            panic!("blank topic should be rejected");
        };
        assert_eq!(err, "topic must not be empty");
    }

    #[tokio::test]
    async fn bookmarks_show_up_in_table_of_contents() {
        let server = test_server().await;
        let Json(toggled) = server
            .toggle_bookmark(Parameters(ToggleBookmarkParams {
                standard: "pmbok7".to_string(),
                section_id: Some("4".to_string()),
            }))
            .await
            .unwrap();
        assert_eq!(toggled.bookmark_id, "pmbok7-4");
        assert!(toggled.bookmarked);

        let Json(toc) = server
            .table_of_contents(Parameters(TableOfContentsParams {
                standard: "pmbok7".to_string(),
                expanded: None,
                expand_all: None,
            }))
            .await
            .unwrap();
        let flags: Vec<(&str, bool)> = toc
            .entries
            .iter()
            .map(|e| (e.id.as_str(), e.bookmarked))
            .collect();
        assert_eq!(flags, vec![("3", false), ("4", true)]);
    }

    #[tokio::test]
    async fn failed_reload_keeps_error_state() {
        let server = test_server().await;
        assert!(server.reload_standards().await.is_err());
        let Err(err) = server
            .search_standards(Parameters(SearchStandardsParams {
                term: "risk".to_string(),
            }))
            .await
        else {
            panic!("search should fail while the catalog is unavailable");
        };
        assert!(err.contains("reload_standards"));
    }

    #[tokio::test]
    async fn process_listing_reports_backend_failure() {
        let server = test_server().await;
        let Err(err) = server.list_processes().await else {
            panic!("unreachable backend should fail the process listing");
        };
        assert!(err.starts_with("unable to load comparison data"));
    }

    #[tokio::test]
    async fn placeholder_ids_are_flagged_and_never_bookmarked() {
        let sections = vec![
            section("1", "Introduction", "", vec![]),
            section("", "Annex", "", vec![]),
        ];
        let server = server_with(vec![standard("pmbok7", "PMBOK Guide", sections)]).await;
        let Ok(Json(toggled)) = server
            .toggle_bookmark(Parameters(ToggleBookmarkParams {
                standard: "pmbok7".to_string(),
                section_id: Some("S2".to_string()),
            }))
            .await
        else {
            panic!("toggle should succeed");
        };
        assert!(toggled.bookmarked);

        let Ok(Json(toc)) = server
            .table_of_contents(Parameters(TableOfContentsParams {
                standard: "pmbok7".to_string(),
                expanded: None,
                expand_all: None,
            }))
            .await
        else {
            panic!("table of contents should load");
        };
        let annex = &toc.entries[1];
        assert_eq!(annex.id, "S2");
        assert!(annex.id_is_placeholder);
        assert!(!annex.bookmarked);
        assert!(!toc.entries[0].id_is_placeholder);
    }

    #[test]
    fn section_hit_reports_matched_fields_and_preview() {
        let standards = fixture_catalog();
        let section = &standards[1].sections[1];
        let info = to_api_hit(SearchHit::Section {
            standard: &standards[1],
            section,
            path: vec!["Risk"],
            matches: SectionMatches {
                title: true,
                text: false,
            },
        });
        assert_eq!(info.kind, HitKind::Section);
        assert_eq!(info.section_id.as_deref(), Some("9"));
        assert_eq!(info.matched_fields, vec!["title"]);
        assert_eq!(info.path, vec!["Risk"]);
        assert!(info.preview.is_some());

        let long = crate::model::fixtures::section("A.1", "Appendix", &"x".repeat(250), vec![]);
        let info = to_api_hit(SearchHit::Section {
            standard: &standards[0],
            section: &long,
            path: vec!["Appendix"],
            matches: SectionMatches {
                title: false,
                text: true,
            },
        });
        let preview = info.preview.unwrap();
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));

        let info = to_api_hit(SearchHit::Standard {
            standard: &standards[0],
            matches: vec![MetaField::Title, MetaField::Publisher],
        });
        assert_eq!(info.matched_fields, vec!["title", "publisher"]);
    }

    #[test]
    fn standard_filter_checks_slug_and_publisher() {
        let standards = fixture_catalog();
        assert!(standard_matches(&standards[2], "iso21500"));
        assert!(standard_matches(&standards[0], "test inst"));
        assert!(!standard_matches(&standards[0], "axelos"));
    }
}
