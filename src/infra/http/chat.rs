use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::application::{
    chat::{ChatError, ChatRequest, ChatResponse},
    error::HttpError,
};

use super::{HttpState, error::ChatApiError};

pub(super) async fn chat(
    State(state): State<HttpState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatApiError> {
    let Json(request) =
        payload.map_err(|rejection| ChatError::InvalidRequest(rejection.body_text()))?;

    let reply = state.chat.reply(&request.messages).await?;
    Ok(Json(ChatResponse::from(reply)))
}

pub(super) async fn method_not_allowed(method: Method) -> Response {
    HttpError::new(
        "infra::http::chat::method_not_allowed",
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        format!("{method} is not supported on /api/chat"),
    )
    .into_response()
}
