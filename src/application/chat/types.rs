use serde::{Deserialize, Serialize};

/// User-facing text returned when the provider refuses a prompt on policy grounds.
pub const BLOCKED_MESSAGE: &str = "Prompt blocked due to security configurations";

/// Speaker of a turn. Roles the provider understands but this crate does not
/// name (`developer`, `tool`, ...) are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(untagged)]
    Other(String),
}

/// One conversation turn, forwarded to the provider as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body accepted by `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Outcome of a single chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The assistant answered; `html` is the rendered reply.
    Rendered { html: String },
    /// The provider blocked the prompt.
    Blocked,
}

impl ChatReply {
    pub fn into_text(self) -> String {
        match self {
            ChatReply::Rendered { html } => html,
            ChatReply::Blocked => BLOCKED_MESSAGE.to_string(),
        }
    }
}

/// Success body returned by `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.into_text(),
        }
    }
}

/// Failure body returned by `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatErrorBody {
    pub error: String,
}
