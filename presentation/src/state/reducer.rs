//! Turn state reducer
//!
//! Folds the orchestrator's event stream into display state. The fold is
//! idempotent and tolerant of event loss: a duplicated arrival event
//! changes nothing, and a stage completion event carries the full
//! authoritative stage result, replacing whatever arrivals accumulated
//! before it. Events for a superseded turn are discarded by turn id
//! rather than merged into newer state.

use council_application::ports::event_sink::TurnEnvelope;
use council_domain::{
    AggregateEntry, CouncilEvent, LabelMap, PendingSet, Stage1Answer, Stage2Critique, TurnId,
    TurnPhase,
};

/// Display state of one turn, maintained by folding events
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    pub turn: TurnId,
    pub phase: TurnPhase,
    /// Models dispatched in the current stage that have not yet reported
    pub pending: PendingSet,
    pub stage1: Vec<Stage1Answer>,
    pub stage2: Vec<Stage2Critique>,
    pub label_to_model: LabelMap,
    pub aggregate: Vec<AggregateEntry>,
    pub final_answer: Option<String>,
    pub title: Option<String>,
    pub error: Option<String>,
}

impl TurnState {
    pub fn new(turn: TurnId) -> Self {
        Self {
            turn,
            phase: TurnPhase::Idle,
            pending: PendingSet::default(),
            stage1: Vec::new(),
            stage2: Vec::new(),
            label_to_model: LabelMap::default(),
            aggregate: Vec::new(),
            final_answer: None,
            title: None,
            error: None,
        }
    }

    /// Whether the turn has reached a terminal state
    pub fn is_settled(&self) -> bool {
        self.phase.is_terminal()
    }

    fn advance(&mut self, next: TurnPhase) -> bool {
        if self.phase.can_transition_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }

    /// Apply one event, returning whether it changed the state.
    ///
    /// Unknown-phase, duplicate, and post-terminal events are ignored
    /// rather than rejected, so replaying a stream (or a portion of one)
    /// converges on the same state.
    pub fn apply(&mut self, event: &CouncilEvent) -> bool {
        if self.phase.is_terminal() {
            return false;
        }

        match event {
            CouncilEvent::Stage1Start { models } => {
                if !self.advance(TurnPhase::Stage1Running) {
                    return false;
                }
                self.pending = PendingSet::start(models.iter().cloned());
                true
            }
            CouncilEvent::Stage1Response { data } => {
                if self.phase != TurnPhase::Stage1Running || !self.pending.settle(&data.model) {
                    return false;
                }
                self.stage1.push(data.clone());
                true
            }
            CouncilEvent::Stage1Complete { data } => {
                if self.phase != TurnPhase::Stage1Running {
                    return false;
                }
                // Authoritative stage result; replaces any partial arrivals
                self.stage1 = data.clone();
                self.pending.clear();
                true
            }
            CouncilEvent::Stage2Start { models, metadata } => {
                if !self.advance(TurnPhase::Stage2Running) {
                    return false;
                }
                self.label_to_model = metadata.label_to_model.clone();
                self.pending = PendingSet::start(models.iter().cloned());
                true
            }
            CouncilEvent::Stage2Response { data } => {
                if self.phase != TurnPhase::Stage2Running || !self.pending.settle(&data.model) {
                    return false;
                }
                self.stage2.push(data.clone());
                true
            }
            CouncilEvent::Stage2Complete { data, metadata } => {
                if self.phase != TurnPhase::Stage2Running {
                    return false;
                }
                self.stage2 = data.clone();
                self.label_to_model = metadata.label_to_model.clone();
                self.aggregate = metadata.aggregate_rankings.clone();
                self.pending.clear();
                true
            }
            CouncilEvent::Stage3Start => self.advance(TurnPhase::Stage3Running),
            CouncilEvent::Stage3Complete { data } => {
                if self.phase != TurnPhase::Stage3Running {
                    return false;
                }
                self.final_answer = Some(data.clone());
                true
            }
            CouncilEvent::TitleComplete { data } => {
                self.title = Some(data.title.clone());
                true
            }
            CouncilEvent::Complete => self.advance(TurnPhase::Complete),
            CouncilEvent::Error { message } => {
                // Terminal from any non-terminal phase, including Idle
                // (validation errors fire before any stage starts)
                self.error = Some(message.clone());
                self.pending.clear();
                self.phase = TurnPhase::Aborted;
                true
            }
        }
    }
}

/// Session-level state: at most one active turn at a time
///
/// Starting a new turn supersedes the previous one; late events from the
/// superseded turn are discarded by id.
#[derive(Debug, Default)]
pub struct SessionState {
    active: Option<TurnState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking a new turn, superseding any previous one
    pub fn begin_turn(&mut self, turn: TurnId) -> &TurnState {
        self.active.insert(TurnState::new(turn))
    }

    pub fn active(&self) -> Option<&TurnState> {
        self.active.as_ref()
    }

    /// Apply an enveloped event, returning whether it changed the state.
    pub fn apply(&mut self, envelope: &TurnEnvelope) -> bool {
        match &mut self.active {
            Some(state) if state.turn == envelope.turn => state.apply(&envelope.event),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{Model, Stage2CompleteMeta, Stage2StartMeta, TitleData};

    fn models() -> Vec<Model> {
        vec![
            Model::new("openai/gpt-5.2"),
            Model::new("google/gemini-3-pro-preview"),
            Model::new("anthropic/claude-opus-4.5"),
        ]
    }

    fn answers() -> Vec<Stage1Answer> {
        models()
            .into_iter()
            .map(|m| {
                let text = format!("answer from {}", m.short_name());
                Stage1Answer::success(m, text)
            })
            .collect()
    }

    fn full_stream() -> Vec<CouncilEvent> {
        let answers = answers();
        let label_map = LabelMap::assign(&answers);
        let critiques: Vec<Stage2Critique> = models()
            .into_iter()
            .map(|m| {
                Stage2Critique::success(
                    m,
                    "1. Response A",
                    vec![council_domain::Label::from("Response A")],
                )
            })
            .collect();

        let mut events = vec![CouncilEvent::Stage1Start { models: models() }];
        for answer in &answers {
            events.push(CouncilEvent::Stage1Response {
                data: answer.clone(),
            });
        }
        events.push(CouncilEvent::Stage1Complete { data: answers });
        events.push(CouncilEvent::Stage2Start {
            models: models(),
            metadata: Stage2StartMeta {
                label_to_model: label_map.clone(),
            },
        });
        for critique in &critiques {
            events.push(CouncilEvent::Stage2Response {
                data: critique.clone(),
            });
        }
        events.push(CouncilEvent::Stage2Complete {
            data: critiques,
            metadata: Stage2CompleteMeta {
                label_to_model: label_map,
                aggregate_rankings: vec![],
            },
        });
        events.push(CouncilEvent::Stage3Start);
        events.push(CouncilEvent::Stage3Complete {
            data: "final".to_string(),
        });
        events.push(CouncilEvent::TitleComplete {
            data: TitleData {
                title: "Title".to_string(),
            },
        });
        events.push(CouncilEvent::Complete);
        events
    }

    fn fold(events: &[CouncilEvent]) -> TurnState {
        let mut state = TurnState::new(TurnId::next());
        for event in events {
            state.apply(event);
        }
        state
    }

    #[test]
    fn test_full_stream_settles_complete() {
        let state = fold(&full_stream());
        assert_eq!(state.phase, TurnPhase::Complete);
        assert_eq!(state.stage1.len(), 3);
        assert_eq!(state.stage2.len(), 3);
        assert_eq!(state.final_answer.as_deref(), Some("final"));
        assert_eq!(state.title.as_deref(), Some("Title"));
        assert!(state.pending.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_duplicate_arrival_is_ignored() {
        let mut state = TurnState::new(TurnId::next());
        state.apply(&CouncilEvent::Stage1Start { models: models() });

        let arrival = CouncilEvent::Stage1Response {
            data: Stage1Answer::success("openai/gpt-5.2", "hi"),
        };
        assert!(state.apply(&arrival));
        assert!(!state.apply(&arrival));
        assert_eq!(state.stage1.len(), 1);
        assert_eq!(state.pending.len(), 2);
    }

    #[test]
    fn test_completion_replaces_partial_arrivals() {
        // Consumer missed two arrival events; the completion event still
        // produces the full authoritative list
        let mut state = TurnState::new(TurnId::next());
        state.apply(&CouncilEvent::Stage1Start { models: models() });
        state.apply(&CouncilEvent::Stage1Response {
            data: answers()[0].clone(),
        });
        state.apply(&CouncilEvent::Stage1Complete { data: answers() });

        assert_eq!(state.stage1.len(), 3);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_replaying_a_stream_converges() {
        let events = full_stream();
        let once = fold(&events);

        let mut twice = TurnState::new(once.turn);
        for event in events.iter().chain(events.iter()) {
            twice.apply(event);
        }
        // Ids differ; compare the folded content
        assert_eq!(once.phase, twice.phase);
        assert_eq!(once.stage1, twice.stage1);
        assert_eq!(once.stage2, twice.stage2);
        assert_eq!(once.final_answer, twice.final_answer);
    }

    #[test]
    fn test_out_of_phase_events_are_ignored() {
        let mut state = TurnState::new(TurnId::next());
        // No stage1_start yet
        assert!(!state.apply(&CouncilEvent::Stage1Response {
            data: answers()[0].clone(),
        }));
        assert!(!state.apply(&CouncilEvent::Stage2Start {
            models: models(),
            metadata: Stage2StartMeta {
                label_to_model: LabelMap::default(),
            },
        }));
        assert_eq!(state.phase, TurnPhase::Idle);
    }

    #[test]
    fn test_nothing_applies_after_terminal() {
        let mut state = fold(&full_stream());
        assert!(state.is_settled());
        assert!(!state.apply(&CouncilEvent::Stage1Start { models: models() }));
        assert!(!state.apply(&CouncilEvent::Error {
            message: "late".to_string(),
        }));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_error_terminates_from_any_phase() {
        let mut idle = TurnState::new(TurnId::next());
        assert!(idle.apply(&CouncilEvent::Error {
            message: "config".to_string(),
        }));
        assert_eq!(idle.phase, TurnPhase::Aborted);

        let mut mid = TurnState::new(TurnId::next());
        mid.apply(&CouncilEvent::Stage1Start { models: models() });
        assert!(mid.apply(&CouncilEvent::Error {
            message: "all failed".to_string(),
        }));
        assert_eq!(mid.phase, TurnPhase::Aborted);
        assert!(mid.pending.is_empty());
    }

    #[test]
    fn test_partial_results_survive_abort() {
        let mut state = TurnState::new(TurnId::next());
        state.apply(&CouncilEvent::Stage1Start { models: models() });
        state.apply(&CouncilEvent::Stage1Response {
            data: answers()[0].clone(),
        });
        state.apply(&CouncilEvent::Error {
            message: "boom".to_string(),
        });

        assert_eq!(state.phase, TurnPhase::Aborted);
        assert_eq!(state.stage1.len(), 1);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_superseded_turn_events_are_discarded() {
        let mut session = SessionState::new();
        let old_turn = TurnId::next();
        session.begin_turn(old_turn);
        session.apply(&TurnEnvelope {
            turn: old_turn,
            event: CouncilEvent::Stage1Start { models: models() },
        });

        let new_turn = TurnId::next();
        session.begin_turn(new_turn);

        // Late event from the superseded turn
        assert!(!session.apply(&TurnEnvelope {
            turn: old_turn,
            event: CouncilEvent::Stage1Response {
                data: answers()[0].clone(),
            },
        }));
        assert_eq!(session.active().unwrap().phase, TurnPhase::Idle);
        assert!(session.active().unwrap().stage1.is_empty());
    }
}
