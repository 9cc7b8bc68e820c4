//! Ports (interfaces) consumed by the application layer

pub mod config_source;
pub mod conversation_store;
pub mod event_sink;
pub mod llm_gateway;
