use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// A project-management standard as served by the backend (e.g. PMBOK 7, PRINCE2).
///
/// Records are trusted but not validated: absent or `null` fields read as empty, and
/// `null` entries inside `sections`, `subsections` or `keyConcepts` are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Standard {
    /// Unique identifier, e.g. "pmbok7", "prince2", "iso21500"
    #[serde(default, deserialize_with = "nullable_string")]
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub meta: Option<StandardMeta>,
    /// Top-level sections in document order
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sections: Vec<Section>,
}

/// Publication metadata attached to a standard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StandardMeta {
    #[serde(default)]
    pub publisher: Option<String>,
    /// Publication year; the backend sends either a number or a string.
    #[serde(default)]
    pub year: Option<TextOrNumber>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub key_concepts: Vec<String>,
}

/// A node in a standard's document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Identifier unique within its standard only, e.g. "4.8". Empty when the backend sent none.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Body text, possibly several paragraphs separated by newlines
    #[serde(default)]
    pub text: Option<String>,
    /// Page reference in the printed standard
    #[serde(default)]
    pub page: Option<TextOrNumber>,
    /// Pointer to a downloadable resource for this section
    #[serde(default)]
    pub file_ref: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subsections: Vec<Section>,
}

/// A scalar the backend sends inconsistently as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TextOrNumber {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for TextOrNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextOrNumber::Number(n) => write!(f, "{n}"),
            TextOrNumber::Text(s) => f.write_str(s),
        }
    }
}

/// A section copy annotated for a specific topic.
///
/// `depth` is only set by the content heuristic (0 for top-level sections) and is
/// informational; ordering uses the score alone.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSection {
    #[serde(flatten)]
    pub section: Section,
    pub relevance_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

/// Backend listings answer with either a bare array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged, bound(deserialize = "T: Deserialize<'de>"))]
pub enum Listing<T> {
    Bare(#[serde(deserialize_with = "nullable_vec")] Vec<T>),
    Wrapped {
        #[serde(default, deserialize_with = "nullable_vec")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped { data } => data,
        }
    }
}

pub type StandardsListing = Listing<Standard>;

/// A tailored process recommendation from `/processes`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Process {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub recommendation: String,
}

impl Standard {
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Standard")
    }

    pub fn publisher(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.publisher.as_deref())
    }
}

impl Section {
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Body split into paragraphs on newlines, as the reader view shows it.
    pub fn paragraphs(&self) -> Vec<String> {
        self.text
            .as_deref()
            .map(|t| t.split('\n').map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// First `max_chars` characters of `text`, with "..." appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// `null` list reads as empty; `null` entries are dropped.
fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Section, Standard, StandardMeta, TextOrNumber};

    pub fn section(id: &str, title: &str, text: &str, subsections: Vec<Section>) -> Section {
        Section {
            id: id.to_string(),
            title: Some(title.to_string()),
            text: Some(text.to_string()),
            page: None,
            file_ref: None,
            subsections,
        }
    }

    pub fn standard(slug: &str, title: &str, sections: Vec<Section>) -> Standard {
        Standard {
            slug: slug.to_string(),
            title: Some(title.to_string()),
            version: Some("1.0".to_string()),
            meta: Some(StandardMeta {
                publisher: Some("Test Institute".to_string()),
                year: Some(TextOrNumber::Number(2021)),
                domain: None,
                key_concepts: vec![],
            }),
            sections,
        }
    }

    /// Three standards shaped like the real backend data.
    pub fn catalog() -> Vec<Standard> {
        vec![
            standard(
                "pmbok7",
                "PMBOK Guide",
                vec![
                    section(
                        "3",
                        "Project Management Principles",
                        "Twelve principles guide behaviour.",
                        vec![
                            section("3.3", "Engage with Stakeholders", "Engage proactively.", vec![]),
                            section("3.10", "Optimize Risk Responses", "Evaluate risk exposure continuously.", vec![]),
                        ],
                    ),
                    section(
                        "4",
                        "Project Performance Domains",
                        "Eight domains of related activities.",
                        vec![
                            section("4.1", "Stakeholder Performance Domain", "Work with stakeholders.", vec![]),
                            section("4.8", "Uncertainty Performance Domain", "Risk and ambiguity.", vec![]),
                        ],
                    ),
                ],
            ),
            standard(
                "prince2",
                "PRINCE2",
                vec![
                    section("6", "Organization", "Roles and responsibilities.", vec![]),
                    section("9", "Risk", "Identify, assess and control uncertainty.", vec![]),
                ],
            ),
            standard(
                "iso21500",
                "ISO 21500",
                vec![section(
                    "4",
                    "Project management processes",
                    "Process groups and subject groups.",
                    vec![section("4.6", "Integration", "Coordinate activities.", vec![])],
                )],
            ),
        ]
    }
}
