/// Keyword-overlap relevance heuristic.
///
/// For every whitespace-separated word of the topic (lowercased):
/// - +10 if the section title contains the word
/// - +5 if the section body contains the word
/// - +3 if any immediate subsection title contains the word
///
/// Matching is plain case-insensitive substring containment. There is no stemming and word
/// order is irrelevant; ties are left to the caller's (stable) ordering.
use crate::model::Section;

const TITLE_WEIGHT: u32 = 10;
const TEXT_WEIGHT: u32 = 5;
const CHILD_TITLE_WEIGHT: u32 = 3;

pub fn score(section: &Section, topic: &str) -> u32 {
    let topic = topic.to_lowercase();
    let words: Vec<&str> = topic.split_whitespace().collect();
    if words.is_empty() {
        return 0;
    }

    let title = section.title_str().to_lowercase();
    let text = section.text_str().to_lowercase();
    let child_titles: Vec<String> = section
        .subsections
        .iter()
        .map(|s| s.title_str().to_lowercase())
        .collect();

    words
        .iter()
        .map(|word| {
            let mut points = 0;
            if title.contains(word) {
                points += TITLE_WEIGHT;
            }
            if text.contains(word) {
                points += TEXT_WEIGHT;
            }
            if child_titles.iter().any(|t| t.contains(word)) {
                points += CHILD_TITLE_WEIGHT;
            }
            points
        })
        .sum()
}
