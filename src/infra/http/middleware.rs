use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

/// Response header echoing the id assigned to the request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub(super) struct RequestId(String);

/// Assign a fresh id to every request and echo it back to the caller, so a
/// failing chat call can be matched with its log line.
pub(super) async fn assign_request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log 4xx/5xx responses together with the diagnostic chain their handler
/// attached. The report is taken out of the response here and never leaves
/// the process.
pub(super) async fn log_failures(request: Request<Body>, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|RequestId(id)| id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let failure = Failure {
        status,
        elapsed_ms: started_at.elapsed().as_millis(),
        source: report.as_ref().map_or("unknown", |report| report.source),
        chain: report.map(|report| report.messages).unwrap_or_default(),
    };

    if status.is_server_error() {
        error!(
            target = "gatechat::http",
            status = failure.status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms = failure.elapsed_ms,
            source = failure.source,
            reason = failure.reason(),
            chain = ?failure.chain,
            request_id = %request_id,
            "request failed"
        );
    } else {
        warn!(
            target = "gatechat::http",
            status = failure.status.as_u16(),
            method = %method,
            path = %path,
            elapsed_ms = failure.elapsed_ms,
            source = failure.source,
            reason = failure.reason(),
            chain = ?failure.chain,
            request_id = %request_id,
            "request rejected"
        );
    }

    response
}

struct Failure {
    status: StatusCode,
    elapsed_ms: u128,
    source: &'static str,
    chain: Vec<String>,
}

impl Failure {
    fn reason(&self) -> &str {
        self.chain
            .first()
            .map(String::as_str)
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("unknown failure")
    }
}
