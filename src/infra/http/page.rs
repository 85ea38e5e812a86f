use axum::{extract::State, http::StatusCode, response::Response};

use crate::presentation::views::{ChatPageTemplate, render_template_response};

use super::HttpState;

pub(super) async fn chat_page(State(state): State<HttpState>) -> Response {
    render_template_response(
        ChatPageTemplate {
            title: state.page_title.to_string(),
        },
        StatusCode::OK,
    )
}
