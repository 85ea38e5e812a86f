use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::render::RenderService;

use super::completion::{Completion, CompletionClient, CompletionError};
use super::types::{ChatMessage, ChatReply};

pub const METRIC_CHAT_REQUESTS_TOTAL: &str = "gatechat_chat_requests_total";
pub const METRIC_CHAT_BLOCKED_TOTAL: &str = "gatechat_chat_blocked_total";
pub const METRIC_CHAT_FAILURES_TOTAL: &str = "gatechat_chat_failures_total";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation must contain at least one message")]
    EmptyConversation,
    #[error("invalid request body: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Upstream(#[from] CompletionError),
}

/// Forwards a conversation upstream and renders the assistant's answer.
pub struct ChatService {
    client: Arc<dyn CompletionClient>,
    renderer: Arc<dyn RenderService>,
}

impl ChatService {
    pub fn new(client: Arc<dyn CompletionClient>, renderer: Arc<dyn RenderService>) -> Self {
        Self { client, renderer }
    }

    /// Run one exchange. The reply text is rendered exactly once; blocked
    /// prompts skip rendering entirely.
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<ChatReply, ChatError> {
        counter!(METRIC_CHAT_REQUESTS_TOTAL).increment(1);

        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        match self.client.complete(messages).await {
            Ok(Completion::Message(markdown)) => {
                let html = self.renderer.render(&markdown);
                debug!(
                    target = "application::chat",
                    turns = messages.len(),
                    reply_bytes = markdown.len(),
                    html_bytes = html.len(),
                    "assistant reply rendered"
                );
                Ok(ChatReply::Rendered { html })
            }
            Ok(Completion::Blocked) => {
                counter!(METRIC_CHAT_BLOCKED_TOTAL).increment(1);
                info!(
                    target = "application::chat",
                    turns = messages.len(),
                    "prompt blocked by provider policy"
                );
                Ok(ChatReply::Blocked)
            }
            Err(err) => {
                counter!(METRIC_CHAT_FAILURES_TOTAL).increment(1);
                Err(ChatError::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::chat::types::{BLOCKED_MESSAGE, Role};
    use crate::application::render::render_service;

    struct ScriptedClient {
        outcome: Result<Completion, CompletionError>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedClient {
        fn new(outcome: Result<Completion, CompletionError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
        ) -> Result<Completion, CompletionError> {
            self.seen
                .lock()
                .expect("seen lock")
                .extend_from_slice(messages);
            self.outcome.clone()
        }
    }

    fn service(client: Arc<ScriptedClient>) -> ChatService {
        ChatService::new(client, render_service())
    }

    #[tokio::test]
    async fn message_is_forwarded_and_rendered() {
        let client = Arc::new(ScriptedClient::new(Ok(Completion::Message(
            "**hi** <b>".to_string(),
        ))));
        let conversation = vec![ChatMessage::user("hello")];

        let reply = service(client.clone())
            .reply(&conversation)
            .await
            .expect("reply");

        assert_eq!(
            reply,
            ChatReply::Rendered {
                html: "<strong>hi</strong> &lt;b&gt;".to_string()
            }
        );
        let seen = client.seen.lock().expect("seen lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].role, Role::User);
    }

    #[tokio::test]
    async fn blocked_prompt_is_not_an_error() {
        let client = Arc::new(ScriptedClient::new(Ok(Completion::Blocked)));
        let reply = service(client)
            .reply(&[ChatMessage::user("bad")])
            .await
            .expect("reply");

        assert_eq!(reply.into_text(), BLOCKED_MESSAGE);
    }

    #[tokio::test]
    async fn empty_conversation_never_reaches_upstream() {
        let client = Arc::new(ScriptedClient::new(Ok(Completion::Blocked)));
        let err = service(client.clone())
            .reply(&[])
            .await
            .expect_err("empty conversation");

        assert!(matches!(err, ChatError::EmptyConversation));
        assert!(client.seen.lock().expect("seen lock").is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_surfaced() {
        let client = Arc::new(ScriptedClient::new(Err(CompletionError::Status(502))));
        let err = service(client)
            .reply(&[ChatMessage::user("hi")])
            .await
            .expect_err("upstream failure");

        assert_eq!(err.to_string(), "AI Gateway Error: 502");
    }
}
