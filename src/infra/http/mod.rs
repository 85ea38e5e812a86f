mod chat;
mod error;
mod middleware;
mod page;

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, routing::post};

use crate::application::chat::ChatService;

pub use error::ChatApiError;
pub use middleware::REQUEST_ID_HEADER;

#[derive(Clone)]
pub struct HttpState {
    pub chat: Arc<ChatService>,
    pub page_title: Arc<str>,
}

/// `POST /api/chat` answers a conversation; every other path serves the chat page.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat).fallback(chat::method_not_allowed))
        .fallback(page::chat_page)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_failures))
        .layer(axum_middleware::from_fn(middleware::assign_request_id))
}
