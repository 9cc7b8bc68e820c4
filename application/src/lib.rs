//! Application layer for llm-council
//!
//! Use cases orchestrate the three-stage council pipeline; ports define
//! the interfaces the pipeline needs from the outside world (model
//! invocation, event delivery, persistence, configuration). Adapters for
//! the ports live in the infrastructure layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ConfigError, ConfigUpdate, CouncilConfig, ReasoningOverride};
pub use ports::config_source::ConfigSource;
pub use ports::conversation_store::{ConversationStore, StorageError};
pub use ports::event_sink::{ChannelSink, EventSink, NoSink, TurnEnvelope};
pub use ports::llm_gateway::{
    ChatMessage, CompletionRequest, ContentPart, GatewayError, ImageUrl, LlmGateway,
    MessageContent,
};
pub use use_cases::run_turn::{RunTurnError, RunTurnInput, RunTurnUseCase, TurnOutcome};
