//! Domain layer for llm-council
//!
//! This crate contains the core pipeline logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## The Council
//!
//! A fixed three-stage pipeline answers each user question:
//!
//! - **Stage 1**: every council model answers the question independently
//! - **Stage 2**: each model ranks the anonymized Stage 1 answers
//! - **Stage 3**: the chairman model synthesizes the final answer
//!
//! The anonymizer, rank parser, and aggregation engine live here as pure
//! functions; fan-out and I/O belong to the application layer.

pub mod attachment;
pub mod conversation;
pub mod core;
pub mod council;
pub mod event;
pub mod prompt;

// Re-export commonly used types
pub use attachment::{validate_images, MAX_IMAGES_PER_MESSAGE};
pub use conversation::{Conversation, ConversationId, ConversationSummary, Message};
pub use core::{
    error::DomainError,
    model::Model,
    question::Question,
    turn::{TurnId, TurnPhase},
};
pub use council::{
    aggregate::{aggregate_rankings, AggregateEntry},
    anonymizer::{Label, LabelMap},
    answer::{Stage1Answer, Stage2Critique},
    pending::PendingSet,
    ranking::parse_ranking,
};
pub use event::{CouncilEvent, Stage2CompleteMeta, Stage2StartMeta, TitleData};
pub use prompt::CouncilPrompt;
