/// Topic comparison across the known standards.
///
/// For each standard the curated section ids from the knowledge base are resolved against
/// the live section tree and tagged with [`PREDEFINED_SCORE`]. When nothing curated
/// resolves, the keyword heuristic supplies the sections instead. Missing data never fails
/// a comparison; it only yields empty lists or generic prose.
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;
use tracing::debug;

use crate::finder;
use crate::knowledge::{InsightBundle, KnowledgeBase};
use crate::model::{ScoredSection, Standard};

/// Score attached to curated sections, marking them as hand-picked rather than heuristic.
pub const PREDEFINED_SCORE: u32 = 90;

/// Maximum number of sections reported per standard.
pub const MAX_SECTIONS_PER_STANDARD: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandardComparison {
    pub sections: Vec<ScoredSection>,
    pub approach: String,
    pub focus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub title: String,
    pub topic: String,
    /// Keyed by standard slug
    pub standards: BTreeMap<String, StandardComparison>,
    pub insights: InsightBundle,
    pub recommendations: Vec<String>,
}

/// Build the comparison of every known standard for `topic`.
///
/// Pure: the same topic, standards and knowledge base always produce an equal result.
pub fn generate_comparison(
    topic: &str,
    standards: &[Standard],
    knowledge: &KnowledgeBase,
) -> ComparisonResult {
    let per_standard = knowledge
        .known_slugs()
        .map(|slug| {
            let sections = relevant_sections(slug, topic, standards, knowledge);
            debug!(standard = slug, topic, sections = sections.len(), "sections selected");
            (
                slug.to_string(),
                StandardComparison {
                    sections,
                    approach: knowledge.approach(slug).to_string(),
                    focus: knowledge.focus(slug).to_string(),
                },
            )
        })
        .collect();

    ComparisonResult {
        title: format!("{topic} Comparison"),
        topic: topic.to_string(),
        standards: per_standard,
        insights: knowledge.insights(topic).clone(),
        recommendations: knowledge.recommendations(topic).to_vec(),
    }
}

/// Curated sections for `(slug, topic)`, or the heuristic top matches when none resolve.
pub fn relevant_sections(
    slug: &str,
    topic: &str,
    standards: &[Standard],
    knowledge: &KnowledgeBase,
) -> Vec<ScoredSection> {
    let Some(standard) = standards.iter().find(|s| s.slug == slug) else {
        return Vec::new();
    };

    let mut sections: Vec<ScoredSection> = knowledge
        .predefined_sections(slug, topic)
        .iter()
        .filter_map(|id| finder::find_by_id(&standard.sections, id))
        .map(|section| ScoredSection {
            section: section.clone(),
            relevance_score: PREDEFINED_SCORE,
            depth: None,
        })
        .collect();

    if sections.is_empty() {
        sections = finder::find_relevant_by_content(standard, topic);
    }

    sections.truncate(MAX_SECTIONS_PER_STANDARD);
    sections
}
