//! Chat exchange: one conversation in, one rendered assistant reply out.

mod completion;
mod service;
mod types;

pub use completion::{Completion, CompletionClient, CompletionError};
pub use service::{
    ChatError, ChatService, METRIC_CHAT_BLOCKED_TOTAL, METRIC_CHAT_FAILURES_TOTAL,
    METRIC_CHAT_REQUESTS_TOTAL,
};
pub use types::{
    BLOCKED_MESSAGE, ChatErrorBody, ChatMessage, ChatReply, ChatRequest, ChatResponse, Role,
};
