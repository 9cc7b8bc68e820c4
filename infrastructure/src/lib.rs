//! Infrastructure layer: adapters behind the application layer's ports
//!
//! - `providers`: the OpenRouter HTTP gateway for model invocation
//! - `config`: configuration file loading and the live config store
//! - `storage`: JSON file persistence for conversations

pub mod config;
pub mod providers;
pub mod storage;

pub use config::loader::ConfigLoader;
pub use config::store::FileConfigStore;
pub use providers::openrouter::OpenRouterGateway;
pub use storage::json_store::JsonConversationStore;
