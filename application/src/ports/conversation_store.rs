//! Conversation persistence port
//!
//! The pipeline does not implement a store; it only requires this
//! read/write contract from one.

use async_trait::async_trait;
use council_domain::{Conversation, ConversationId, ConversationSummary, Message};
use thiserror::Error;

/// Errors from the persistence adapter
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Read/write contract for conversation persistence
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new empty conversation
    async fn create(&self) -> Result<Conversation, StorageError>;

    /// Load a conversation with all its messages
    async fn get(&self, id: &ConversationId) -> Result<Conversation, StorageError>;

    /// List all conversations (metadata only), newest first
    async fn list(&self) -> Result<Vec<ConversationSummary>, StorageError>;

    /// Append a message to a conversation
    async fn append_message(
        &self,
        id: &ConversationId,
        message: Message,
    ) -> Result<(), StorageError>;

    /// Replace a conversation's title
    async fn set_title(&self, id: &ConversationId, title: &str) -> Result<(), StorageError>;
}
