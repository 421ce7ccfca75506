/// Curated comparison knowledge: which sections of each standard speak to a topic, how each
/// standard approaches project management, and the canned insight/recommendation prose.
///
/// The tables are configuration data. A default set is compiled in from
/// `data/knowledge.json`; `PM_KNOWLEDGE_PATH` points at a replacement file with the same
/// shape.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

const EMBEDDED_KNOWLEDGE: &str = include_str!("../data/knowledge.json");

/// Similarities, differences and unique points of the standards for one topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightBundle {
    #[serde(default)]
    pub similarities: Vec<String>,
    #[serde(default)]
    pub differences: Vec<String>,
    #[serde(default)]
    pub unique_points: Vec<String>,
}

/// Per-standard entry of the knowledge base.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardProfile {
    pub slug: String,
    pub approach: String,
    pub focus: String,
    /// Topic -> curated section ids, in presentation order
    #[serde(default)]
    pub sections: HashMap<String, Vec<String>>,
    /// Format ("pdf", "epub", "html") -> official URL
    #[serde(default)]
    pub downloads: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    #[serde(default)]
    topics: Vec<String>,
    standards: Vec<StandardProfile>,
    default_approach: String,
    default_focus: String,
    #[serde(default)]
    insights: HashMap<String, InsightBundle>,
    default_insights: InsightBundle,
    #[serde(default)]
    recommendations: HashMap<String, Vec<String>>,
    default_recommendations: Vec<String>,
}

impl KnowledgeBase {
    /// Load the knowledge base from `path`, or the compiled-in default when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Self::from_json(EMBEDDED_KNOWLEDGE);
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Knowledge(format!("failed to read {}: {e}", path.display()))
        })?;
        let knowledge = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            standards = knowledge.standards.len(),
            topics = knowledge.topics.len(),
            "loaded knowledge base override"
        );
        Ok(knowledge)
    }

    pub fn embedded() -> Result<Self, AppError> {
        Self::from_json(EMBEDDED_KNOWLEDGE)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let knowledge: KnowledgeBase = serde_json::from_str(content)
            .map_err(|e| AppError::Knowledge(format!("invalid knowledge base: {e}")))?;
        knowledge.validate()?;
        Ok(knowledge)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.standards.is_empty() {
            return Err(AppError::Knowledge(
                "knowledge base lists no standards".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for profile in &self.standards {
            if profile.slug.trim().is_empty() {
                return Err(AppError::Knowledge("standard with empty slug".to_string()));
            }
            if !seen.insert(profile.slug.as_str()) {
                return Err(AppError::Knowledge(format!(
                    "duplicate standard slug: {}",
                    profile.slug
                )));
            }
        }
        Ok(())
    }

    /// Slugs every comparison reports on, in configuration order.
    pub fn known_slugs(&self) -> impl Iterator<Item = &str> {
        self.standards.iter().map(|p| p.slug.as_str())
    }

    pub fn profile(&self, slug: &str) -> Option<&StandardProfile> {
        self.standards.iter().find(|p| p.slug == slug)
    }

    /// Curated section ids for `(slug, topic)`; empty when no mapping exists.
    pub fn predefined_sections(&self, slug: &str, topic: &str) -> &[String] {
        self.profile(slug)
            .and_then(|p| p.sections.get(topic))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn approach(&self, slug: &str) -> &str {
        self.profile(slug)
            .map(|p| p.approach.as_str())
            .unwrap_or(&self.default_approach)
    }

    pub fn focus(&self, slug: &str) -> &str {
        self.profile(slug)
            .map(|p| p.focus.as_str())
            .unwrap_or(&self.default_focus)
    }

    pub fn insights(&self, topic: &str) -> &InsightBundle {
        self.insights.get(topic).unwrap_or(&self.default_insights)
    }

    pub fn default_insights(&self) -> &InsightBundle {
        &self.default_insights
    }

    pub fn recommendations(&self, topic: &str) -> &[String] {
        self.recommendations
            .get(topic)
            .unwrap_or(&self.default_recommendations)
    }

    pub fn default_recommendations(&self) -> &[String] {
        &self.default_recommendations
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Topics whose name contains `filter`, ignoring case. An empty filter keeps everything.
    pub fn filter_topics(&self, filter: &str) -> Vec<&str> {
        let needle = filter.to_lowercase();
        self.topics
            .iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Official download URL for a standard, falling back to its PDF link.
    pub fn download_link(&self, slug: &str, format: &str) -> Option<&str> {
        let downloads = &self.profile(slug)?.downloads;
        downloads
            .get(&format.to_lowercase())
            .or_else(|| downloads.get("pdf"))
            .map(String::as_str)
    }
}
