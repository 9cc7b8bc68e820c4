//! Conversation persistence adapters

pub mod json_store;
