//! Immutable stage result types
//!
//! - [`Stage1Answer`] - one model's answer to the user question
//! - [`Stage2Critique`] - one model's ranking of the anonymized answers
//!
//! Both record per-model transport failures as data (`failed: true`)
//! rather than errors; a single model's failure never aborts a stage.

use crate::core::model::Model;
use crate::council::anonymizer::Label;
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Response from a single model in Stage 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage1Answer {
    /// The model that produced this answer
    pub model: Model,
    /// The answer text, `None` if the call failed
    pub response: Option<String>,
    /// Whether the invocation failed or timed out
    #[serde(default, skip_serializing_if = "is_false")]
    pub failed: bool,
}

impl Stage1Answer {
    /// Create a successful answer
    pub fn success(model: impl Into<Model>, response: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response: Some(response.into()),
            failed: false,
        }
    }

    /// Record that a model failed to answer
    pub fn failure(model: impl Into<Model>) -> Self {
        Self {
            model: model.into(),
            response: None,
            failed: true,
        }
    }

    pub fn is_success(&self) -> bool {
        !self.failed && self.response.is_some()
    }

    /// The answer text, empty if failed
    pub fn text(&self) -> &str {
        self.response.as_deref().unwrap_or("")
    }
}

/// Ranking critique from a single model in Stage 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Critique {
    /// The model that produced this critique
    pub model: Model,
    /// The raw critique text, `None` if the call failed
    pub ranking: Option<String>,
    /// Labels extracted from the critique, best to worst.
    /// Empty when the call failed or the text yielded no recognizable labels.
    #[serde(default)]
    pub parsed_ranking: Vec<Label>,
    /// Whether the invocation failed or timed out
    #[serde(default, skip_serializing_if = "is_false")]
    pub failed: bool,
}

impl Stage2Critique {
    /// Create a successful critique with its parsed ranking
    pub fn success(
        model: impl Into<Model>,
        ranking: impl Into<String>,
        parsed_ranking: Vec<Label>,
    ) -> Self {
        Self {
            model: model.into(),
            ranking: Some(ranking.into()),
            parsed_ranking,
            failed: false,
        }
    }

    /// Record that a model failed to produce a critique
    pub fn failure(model: impl Into<Model>) -> Self {
        Self {
            model: model.into(),
            ranking: None,
            parsed_ranking: Vec::new(),
            failed: true,
        }
    }

    pub fn is_success(&self) -> bool {
        !self.failed && self.ranking.is_some()
    }

    /// Whether this critique contributes to aggregation.
    ///
    /// Unparsed critiques are retained for display but excluded here.
    pub fn is_parsed(&self) -> bool {
        self.is_success() && !self.parsed_ranking.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_answer_wire_shape() {
        let answer = Stage1Answer::success("openai/gpt-5.2", "hello");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "openai/gpt-5.2", "response": "hello"})
        );
    }

    #[test]
    fn test_failed_answer_wire_shape() {
        let answer = Stage1Answer::failure("openai/gpt-5.2");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "openai/gpt-5.2", "response": null, "failed": true})
        );
    }

    #[test]
    fn test_unparsed_critique_excluded_from_aggregation() {
        let critique = Stage2Critique::success("openai/gpt-5.2", "no labels here", vec![]);
        assert!(critique.is_success());
        assert!(!critique.is_parsed());
    }

    #[test]
    fn test_failed_critique() {
        let critique = Stage2Critique::failure("openai/gpt-5.2");
        assert!(!critique.is_success());
        assert!(!critique.is_parsed());
        assert!(critique.parsed_ranking.is_empty());
    }
}
