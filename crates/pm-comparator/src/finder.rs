/// Depth-first lookups over a standard's section tree.
///
/// Every walk is pre-order and total: absent subsections are just empty lists, so none of
/// these functions can fail.
use tracing::debug;

use crate::model::{ScoredSection, Section, Standard};
use crate::relevance;

/// Maximum number of sections returned by the content heuristic.
pub const MAX_RELEVANT_BY_CONTENT: usize = 3;

/// First section in pre-order whose id equals `id` exactly.
///
/// Ids are only unique per standard by convention; when duplicates exist the first one
/// encountered wins.
pub fn find_by_id<'a>(sections: &'a [Section], id: &str) -> Option<&'a Section> {
    for section in sections {
        if section.id == id {
            return Some(section);
        }
        if let Some(found) = find_by_id(&section.subsections, id) {
            return Some(found);
        }
    }
    None
}

/// Top sections of `standard` for `topic` by keyword overlap.
///
/// Keeps nodes with a positive score, tags them with their depth, sorts by score descending
/// (stable, so ties stay in document order) and keeps the first three.
pub fn find_relevant_by_content(standard: &Standard, topic: &str) -> Vec<ScoredSection> {
    let mut relevant = Vec::new();
    collect_relevant(&standard.sections, topic, 0, &mut relevant);
    relevant.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    relevant.truncate(MAX_RELEVANT_BY_CONTENT);
    debug!(
        standard = %standard.slug,
        topic,
        found = relevant.len(),
        "content relevance fallback"
    );
    relevant
}

fn collect_relevant(sections: &[Section], topic: &str, depth: usize, out: &mut Vec<ScoredSection>) {
    for section in sections {
        let relevance_score = relevance::score(section, topic);
        if relevance_score > 0 {
            out.push(ScoredSection {
                section: section.clone(),
                relevance_score,
                depth: Some(depth),
            });
        }
        collect_relevant(&section.subsections, topic, depth + 1, out);
    }
}

/// Standard-level fields the metadata search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Title,
    Version,
    Publisher,
}

impl MetaField {
    pub fn as_str(self) -> &'static str {
        match self {
            MetaField::Title => "title",
            MetaField::Version => "version",
            MetaField::Publisher => "publisher",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionMatches {
    pub title: bool,
    pub text: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchHit<'a> {
    Standard {
        standard: &'a Standard,
        matches: Vec<MetaField>,
    },
    Section {
        standard: &'a Standard,
        section: &'a Section,
        /// Titles from the top-level section down to and including `section`.
        path: Vec<&'a str>,
        matches: SectionMatches,
    },
}

/// Plain substring search across standards and their whole section trees.
///
/// Metadata hits come first, in standard order. Section hits follow in document order
/// (pre-order within a standard, standards in input order). No scoring is applied.
pub fn search_standards<'a>(standards: &'a [Standard], term: &str) -> Vec<SearchHit<'a>> {
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();

    let mut hits: Vec<SearchHit<'a>> = standards
        .iter()
        .filter_map(|standard| {
            let matches = metadata_matches(standard, &needle);
            (!matches.is_empty()).then_some(SearchHit::Standard { standard, matches })
        })
        .collect();

    for standard in standards {
        let mut path = Vec::new();
        search_sections(standard, &standard.sections, &needle, &mut path, &mut hits);
    }

    hits
}

fn metadata_matches(standard: &Standard, needle: &str) -> Vec<MetaField> {
    [
        (MetaField::Title, standard.title.as_deref()),
        (MetaField::Version, standard.version.as_deref()),
        (MetaField::Publisher, standard.publisher()),
    ]
    .into_iter()
    .filter(|(_, value)| matches!(value, Some(v) if contains_ci(v, needle)))
    .map(|(field, _)| field)
    .collect()
}

fn search_sections<'a>(
    standard: &'a Standard,
    sections: &'a [Section],
    needle: &str,
    path: &mut Vec<&'a str>,
    hits: &mut Vec<SearchHit<'a>>,
) {
    for section in sections {
        path.push(section.title_str());

        let matches = SectionMatches {
            title: contains_ci(section.title_str(), needle),
            text: contains_ci(section.text_str(), needle),
        };
        if matches.title || matches.text {
            hits.push(SearchHit::Section {
                standard,
                section,
                path: path.clone(),
                matches,
            });
        }

        search_sections(standard, &section.subsections, needle, path, hits);
        path.pop();
    }
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
