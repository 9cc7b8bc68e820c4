//! Typed event stream vocabulary for one turn
//!
//! The orchestrator serializes pipeline progress into this ordered
//! sequence; consumers fold it into turn state via the client reducer.
//! The serde shapes match the wire protocol exactly: a tagged `type`
//! field plus event-specific payloads, e.g.
//! `{"type": "stage1_response", "data": {"model": "...", "response": "..."}}`.
//!
//! Ordering guarantees: per-stage arrival events may appear in any order
//! relative to each other, but a stage's completion event is emitted
//! strictly after every arrival event of that stage. `Complete` and
//! `Error` are terminal; nothing follows them for that turn.

use crate::council::aggregate::AggregateEntry;
use crate::council::anonymizer::LabelMap;
use crate::council::answer::{Stage1Answer, Stage2Critique};
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Metadata attached to `stage2_start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2StartMeta {
    pub label_to_model: LabelMap,
}

/// Metadata attached to `stage2_complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2CompleteMeta {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateEntry>,
}

/// Payload of `title_complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleData {
    pub title: String,
}

/// One event in a turn's progress stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    /// Stage 1 dispatched to these models
    Stage1Start { models: Vec<Model> },
    /// One Stage 1 call settled (success or failure)
    Stage1Response { data: Stage1Answer },
    /// Stage 1 finished; `data` holds only successes, in council order
    Stage1Complete { data: Vec<Stage1Answer> },
    /// Stage 2 dispatched; carries the fixed label-to-model bijection
    Stage2Start {
        models: Vec<Model>,
        metadata: Stage2StartMeta,
    },
    /// One Stage 2 call settled
    Stage2Response { data: Stage2Critique },
    /// Stage 2 finished; carries all critiques and the leaderboard
    Stage2Complete {
        data: Vec<Stage2Critique>,
        metadata: Stage2CompleteMeta,
    },
    /// Chairman synthesis started
    Stage3Start,
    /// Final answer text
    Stage3Complete { data: String },
    /// Conversation title is ready (first message only)
    TitleComplete { data: TitleData },
    /// Terminal success
    Complete,
    /// Terminal failure; partial results streamed so far remain valid
    Error { message: String },
}

impl CouncilEvent {
    /// The wire `type` tag for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            CouncilEvent::Stage1Start { .. } => "stage1_start",
            CouncilEvent::Stage1Response { .. } => "stage1_response",
            CouncilEvent::Stage1Complete { .. } => "stage1_complete",
            CouncilEvent::Stage2Start { .. } => "stage2_start",
            CouncilEvent::Stage2Response { .. } => "stage2_response",
            CouncilEvent::Stage2Complete { .. } => "stage2_complete",
            CouncilEvent::Stage3Start => "stage3_start",
            CouncilEvent::Stage3Complete { .. } => "stage3_complete",
            CouncilEvent::TitleComplete { .. } => "title_complete",
            CouncilEvent::Complete => "complete",
            CouncilEvent::Error { .. } => "error",
        }
    }

    /// Whether this event terminates the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, CouncilEvent::Complete | CouncilEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage1_start_wire_shape() {
        let event = CouncilEvent::Stage1Start {
            models: vec![Model::new("openai/gpt-5.2")],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "stage1_start", "models": ["openai/gpt-5.2"]})
        );
    }

    #[test]
    fn test_stage1_response_wire_shape() {
        let event = CouncilEvent::Stage1Response {
            data: Stage1Answer::success("openai/gpt-5.2", "hello"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "stage1_response",
                "data": {"model": "openai/gpt-5.2", "response": "hello"}
            })
        );
    }

    #[test]
    fn test_unit_variants_serialize_bare() {
        assert_eq!(
            serde_json::to_value(CouncilEvent::Stage3Start).unwrap(),
            serde_json::json!({"type": "stage3_start"})
        );
        assert_eq!(
            serde_json::to_value(CouncilEvent::Complete).unwrap(),
            serde_json::json!({"type": "complete"})
        );
    }

    #[test]
    fn test_error_event() {
        let event = CouncilEvent::Error {
            message: "boom".into(),
        };
        assert!(event.is_terminal());
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "error", "message": "boom"})
        );
    }

    #[test]
    fn test_roundtrip_through_json() {
        let event = CouncilEvent::Stage3Complete {
            data: "final answer".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: CouncilEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_event_type_matches_serde_tag() {
        let event = CouncilEvent::TitleComplete {
            data: TitleData {
                title: "Rust questions".into(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }
}
