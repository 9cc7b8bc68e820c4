//! Anonymization of Stage 1 answers for blind peer review
//!
//! Labels are assigned sequentially over the *final* Stage 1 answer list,
//! which is ordered by council position rather than arrival order. The
//! resulting [`LabelMap`] is therefore deterministic for a given council
//! order and success set, and is built exactly once per turn.

use crate::core::model::Model;
use crate::council::answer::Stage1Answer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque label standing in for a model's answer during peer review
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Label for the answer at `index` in the final Stage 1 list
    /// (`0` → "Response A", `1` → "Response B", …).
    ///
    /// Councils larger than the alphabet fall back to numbered labels
    /// ("Response 27", …) rather than walking past `Z`.
    pub fn from_index(index: usize) -> Self {
        if index < 26 {
            Self(format!("Response {}", (b'A' + index as u8) as char))
        } else {
            Self(format!("Response {}", index + 1))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Bijection between labels and the models behind them
///
/// Fixed for the remainder of the turn once computed; it must never be
/// recomputed mid-turn even if Stage 1 answers arrived in a different
/// order across retries. Serializes as a `{label: model}` map, matching
/// the `label_to_model` metadata on the event stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    entries: BTreeMap<Label, Model>,
}

impl LabelMap {
    /// Assign labels sequentially over the successful answers, in the
    /// order given (council order, not arrival order).
    pub fn assign(answers: &[Stage1Answer]) -> Self {
        let entries = answers
            .iter()
            .filter(|a| a.is_success())
            .enumerate()
            .map(|(i, a)| (Label::from_index(i), a.model.clone()))
            .collect();
        Self { entries }
    }

    /// The model behind a label, if the label is valid for this turn
    pub fn model_for(&self, label: &Label) -> Option<&Model> {
        self.entries.get(label)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in assignment order ("Response A", "Response B", …)
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Model)> {
        self.entries.iter()
    }

    /// Replace every literal label occurrence with the model's short name.
    ///
    /// A pure, idempotent transform applied only at presentation time:
    /// the output contains no label substrings, so applying it twice
    /// yields the same text, and text without labels passes through
    /// unchanged.
    pub fn deanonymize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (label, model) in &self.entries {
            out = out.replace(label.as_str(), model.short_name());
        }
        out
    }
}
