//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Per-model transport failures and parse failures are *not* errors: they
/// are recorded as data (`failed` answers, empty parsed rankings) and never
/// cross stage boundaries. Only pipeline-level faults surface here.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("All council models failed to respond")]
    AllModelsFailed,

    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("Too many attachments: {count} (maximum {max})")]
    TooManyAttachments { count: usize, max: usize },
}

impl DomainError {
    /// Whether this error should be rejected before the turn is dispatched
    /// (input validation) rather than aborting a running pipeline.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidAttachment(_) | DomainError::TooManyAttachments { .. }
        )
    }
}
