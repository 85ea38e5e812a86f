use async_trait::async_trait;
use thiserror::Error;

use super::types::ChatMessage;

/// What the provider produced for a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Raw Markdown text of the assistant turn.
    Message(String),
    /// The provider refused the prompt on policy grounds.
    Blocked,
}

#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("AI Gateway Error: {0}")]
    Status(u16),
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
    #[error("upstream response did not include assistant content")]
    MissingContent,
}

/// Boundary to the remote chat-completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, CompletionError>;
}
