use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    application::{
        chat::{METRIC_CHAT_BLOCKED_TOTAL, METRIC_CHAT_FAILURES_TOTAL, METRIC_CHAT_REQUESTS_TOTAL},
        render::METRIC_RENDER_MS,
    },
    config::{LogFormat, LoggingSettings},
};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Events go to stderr so the `render` command can keep stdout for HTML.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CHAT_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of chat exchanges received."
        );
        describe_counter!(
            METRIC_CHAT_BLOCKED_TOTAL,
            Unit::Count,
            "Total number of prompts blocked by provider policy."
        );
        describe_counter!(
            METRIC_CHAT_FAILURES_TOTAL,
            Unit::Count,
            "Total number of chat exchanges that failed upstream."
        );
        describe_histogram!(
            METRIC_RENDER_MS,
            Unit::Milliseconds,
            "Markdown render latency in milliseconds."
        );
    });
}
