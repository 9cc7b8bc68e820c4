//! LLM Gateway port
//!
//! The model invocation capability: given a model identifier and a
//! prompt, return response text or a typed failure within the bound the
//! caller supplies. Calls may be slow or fail independently per model;
//! the pipeline never treats a single call's failure as fatal.

use crate::config::ReasoningOverride;
use async_trait::async_trait;
use council_domain::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a model invocation
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Timeout")]
    Timeout,
}

/// Reference to an attached image, as a base64 data URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// One part of a multimodal message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message content: plain text, or a multimodal part array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A chat message in provider wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// User message with optional image attachments.
    ///
    /// Without images this stays a plain text message; with images it
    /// becomes a multimodal part array.
    pub fn user_with_images(text: impl Into<String>, images: &[String]) -> Self {
        let text = text.into();
        if images.is_empty() {
            return Self::user(text);
        }

        let mut parts = vec![ContentPart::Text { text }];
        for url in images {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            });
        }
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// One completion request to a model
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Reasoning parameter to inject into the payload, if any
    pub reasoning: Option<ReasoningOverride>,
    /// Bound on the whole call; the gateway must not block past it
    pub timeout: Duration,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, timeout: Duration) -> Self {
        Self {
            messages,
            reasoning: None,
            timeout,
        }
    }

    pub fn with_reasoning(mut self, reasoning: Option<ReasoningOverride>) -> Self {
        self.reasoning = reasoning;
        self
    }
}

/// Gateway for model invocation
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Invoke `model` with the request, returning the response text.
    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<String, GatewayError>;
}
