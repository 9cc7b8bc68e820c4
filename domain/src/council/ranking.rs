//! Ranking extraction from free-form critique text
//!
//! Stage 2 asks each model to rank the anonymized answers, but models
//! format their rankings however they please: numbered lists, bullet
//! lists, or inline prose. [`parse_ranking`] is a total function over
//! that text: it always returns a (possibly empty) ordered list and
//! never fails, regardless of malformed or adversarial input.

use crate::council::anonymizer::{Label, LabelMap};

/// Extract the ordered list of labels a critique proposes.
///
/// Strategy, in order of preference:
///
/// 1. **List lines**: lines starting with a list marker (`1.`, `2)`, `-`,
///    `*`, `•`) that mention a known label. This captures the "final
///    ranking" section models usually end with.
/// 2. **Inline fallback**: if no list lines mention any label, every
///    known-label occurrence across the whole text in position order.
///
/// Labels not present in `labels` are dropped silently; duplicates keep
/// their first occurrence. Text with no recognizable labels yields an
/// empty list (the critique is then marked unparsed and excluded from
/// aggregation, but still shown).
pub fn parse_ranking(text: &str, labels: &LabelMap) -> Vec<Label> {
    let mut ordered = parse_list_lines(text, labels);
    if ordered.is_empty() {
        ordered = occurrences(text, labels);
    }
    dedupe_keeping_first(ordered)
}

/// Labels found on list-marker lines, in line order then in-line position order
fn parse_list_lines(text: &str, labels: &LabelMap) -> Vec<Label> {
    text.lines()
        .filter(|line| is_list_line(line))
        .flat_map(|line| occurrences(line, labels))
        .collect()
}

/// Whether a line looks like a list entry: `1.`, `12)`, `3:`, `-`, `*`, `•`
fn is_list_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('-') || trimmed.starts_with('*') || trimmed.starts_with('•') {
        return true;
    }
    let rest = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < trimmed.len() && matches!(rest.chars().next(), Some('.' | ')' | ':'))
}

/// All known-label occurrences in `text`, ordered by byte position
fn occurrences(text: &str, labels: &LabelMap) -> Vec<Label> {
    let mut found: Vec<(usize, &Label)> = labels
        .labels()
        .flat_map(|label| text.match_indices(label.as_str()).map(move |(i, _)| (i, label)))
        .collect();
    found.sort_by_key(|(i, _)| *i);
    found.into_iter().map(|(_, label)| label.clone()).collect()
}

fn dedupe_keeping_first(ordered: Vec<Label>) -> Vec<Label> {
    let mut seen = std::collections::HashSet::new();
    ordered
        .into_iter()
        .filter(|label| seen.insert(label.clone()))
        .collect()
}
