//! Conversation entities
//!
//! A conversation is an ordered message history: user messages (with
//! optional image attachments) interleaved with assistant messages that
//! carry the full three-stage council output. The pipeline only needs
//! the read/write contract defined by the application layer's store
//! port; these are the records that contract trades in.

use crate::council::answer::{Stage1Answer, Stage2Critique};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One message in a conversation, discriminated by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// A user question, with optional base64 image data URLs
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<String>,
    },
    /// The council's full answer to the preceding user message
    Assistant {
        stage1: Vec<Stage1Answer>,
        stage2: Vec<Stage2Critique>,
        stage3: String,
    },
}

impl Message {
    pub fn user(content: impl Into<String>, images: Vec<String>) -> Self {
        Message::User {
            content: content.into(),
            images,
        }
    }

    pub fn assistant(
        stage1: Vec<Stage1Answer>,
        stage2: Vec<Stage2Critique>,
        stage3: impl Into<String>,
    ) -> Self {
        Message::Assistant {
            stage1,
            stage2,
            stage3: stage3.into(),
        }
    }
}

/// A full conversation with all messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation with a placeholder title
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            title: "New Conversation".to_string(),
            messages: Vec::new(),
        }
    }

    /// Whether the next user message would be the first in this
    /// conversation (and should trigger title generation)
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Metadata-only view for list endpoints
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            title: self.title.clone(),
            message_count: self.messages.len(),
        }
    }
}

/// Conversation metadata for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub message_count: usize,
}
