//! Turn identity and the turn phase state machine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TURN_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier for one user turn (question + pipeline execution)
///
/// Every event the orchestrator emits is tagged with the turn it belongs
/// to, so a consumer can discard events from a superseded turn instead of
/// merging them into newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(u64);

impl TurnId {
    /// Allocate a fresh, process-unique turn id
    pub fn next() -> Self {
        Self(NEXT_TURN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// Phase of a turn's pipeline execution
///
/// Transitions are strictly sequential; no stage begins before the
/// previous stage's completion event has been emitted. `Complete` and
/// `Aborted` are terminal: no further events are applied afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Stage1Running,
    Stage2Running,
    Stage3Running,
    Complete,
    Aborted,
}

impl TurnPhase {
    pub fn as_str(&self) -> &str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Stage1Running => "stage1_running",
            TurnPhase::Stage2Running => "stage2_running",
            TurnPhase::Stage3Running => "stage3_running",
            TurnPhase::Complete => "complete",
            TurnPhase::Aborted => "aborted",
        }
    }

    /// Whether this phase accepts no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Complete | TurnPhase::Aborted)
    }

    /// Whether a transition to `next` is legal
    pub fn can_transition_to(&self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        match (self, next) {
            (Idle, Stage1Running) => true,
            (Stage1Running, Stage2Running) => true,
            (Stage2Running, Stage3Running) => true,
            (Stage3Running, Complete) => true,
            // Any running state may abort on a pipeline-level error
            (Stage1Running | Stage2Running | Stage3Running, Aborted) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_ids_are_unique() {
        let a = TurnId::next();
        let b = TurnId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_transitions() {
        assert!(TurnPhase::Idle.can_transition_to(TurnPhase::Stage1Running));
        assert!(TurnPhase::Stage1Running.can_transition_to(TurnPhase::Stage2Running));
        assert!(TurnPhase::Stage2Running.can_transition_to(TurnPhase::Stage3Running));
        assert!(TurnPhase::Stage3Running.can_transition_to(TurnPhase::Complete));
    }

    #[test]
    fn test_no_stage_skipping() {
        assert!(!TurnPhase::Idle.can_transition_to(TurnPhase::Stage2Running));
        assert!(!TurnPhase::Stage1Running.can_transition_to(TurnPhase::Stage3Running));
        assert!(!TurnPhase::Stage1Running.can_transition_to(TurnPhase::Complete));
    }

    #[test]
    fn test_abort_from_any_running_state() {
        assert!(TurnPhase::Stage1Running.can_transition_to(TurnPhase::Aborted));
        assert!(TurnPhase::Stage2Running.can_transition_to(TurnPhase::Aborted));
        assert!(TurnPhase::Stage3Running.can_transition_to(TurnPhase::Aborted));
        assert!(!TurnPhase::Idle.can_transition_to(TurnPhase::Aborted));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [
            TurnPhase::Idle,
            TurnPhase::Stage1Running,
            TurnPhase::Stage2Running,
            TurnPhase::Stage3Running,
            TurnPhase::Complete,
            TurnPhase::Aborted,
        ] {
            assert!(!TurnPhase::Complete.can_transition_to(next));
            assert!(!TurnPhase::Aborted.can_transition_to(next));
        }
        assert!(TurnPhase::Complete.is_terminal());
        assert!(TurnPhase::Aborted.is_terminal());
    }
}
