//! Markdown rendering for assistant replies.
//!
//! The pipeline is pure: it accepts the raw text of one model message and
//! returns an HTML fragment that is safe to assign as a message bubble's inner
//! HTML. Apart from a latency histogram, rendering has no side effects.

mod service;
mod types;

pub use service::{ChatMarkdownRenderer, METRIC_RENDER_MS, render_markdown, render_service};
pub use types::RenderService;
