use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::{
    chat::{ChatError, ChatErrorBody},
    error::ErrorReport,
};

/// JSON error response for the chat API. The public message is the error's
/// display text, matching what the chat page shows to the user.
#[derive(Debug)]
pub struct ChatApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ChatApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ChatError> for ChatApiError {
    fn from(error: ChatError) -> Self {
        let status = match &error {
            ChatError::EmptyConversation | ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let report = ErrorReport::from_error("infra::http::chat", status, &error);
        Self {
            status,
            message: error.to_string(),
            report,
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let body = ChatErrorBody {
            error: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
