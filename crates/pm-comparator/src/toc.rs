/// Table-of-contents flattening for a standard's section tree.
///
/// Children are listed only under expanded sections, mirroring the collapsible reader view.
use std::collections::HashSet;

use crate::model::Section;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Section id, or `S<n>` (1-based position among siblings) when the section has none
    pub id: String,
    /// `id` was generated because the section has none
    pub id_is_placeholder: bool,
    pub title: String,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Which sections show their children.
#[derive(Debug, Clone, Copy)]
pub enum Expansion<'a> {
    All,
    Only(&'a HashSet<String>),
}

impl Expansion<'_> {
    fn is_expanded(&self, id: &str) -> bool {
        match self {
            Expansion::All => true,
            Expansion::Only(ids) => ids.contains(id),
        }
    }
}

pub fn flatten(sections: &[Section], expansion: Expansion<'_>) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    walk(sections, 0, expansion, &mut entries);
    entries
}

fn walk(sections: &[Section], level: usize, expansion: Expansion<'_>, out: &mut Vec<TocEntry>) {
    for (index, section) in sections.iter().enumerate() {
        let id_is_placeholder = section.id.is_empty();
        let id = if id_is_placeholder {
            format!("S{}", index + 1)
        } else {
            section.id.clone()
        };
        let title = match section.title.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => "Untitled Section".to_string(),
        };
        let has_children = !section.subsections.is_empty();
        let expanded = has_children && expansion.is_expanded(&id);

        out.push(TocEntry {
            id,
            id_is_placeholder,
            title,
            level,
            has_children,
            expanded,
        });

        if expanded {
            walk(&section.subsections, level + 1, expansion, out);
        }
    }
}
