mod blocks;
mod escape;
mod fragments;
mod inline;

use std::{sync::Arc, time::Instant};

use metrics::histogram;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::application::render::types::RenderService;

use self::fragments::Fragments;

pub const METRIC_RENDER_MS: &str = "gatechat_render_ms";

/// Line-oriented Markdown renderer for chat replies.
///
/// The renderer is an ordered chain of text rewrites. Stage order encodes
/// precedence, so reordering the calls in [`RenderService::render`] changes
/// observable output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChatMarkdownRenderer;

static RENDER_SERVICE: Lazy<Arc<ChatMarkdownRenderer>> =
    Lazy::new(|| Arc::new(ChatMarkdownRenderer));

/// Access the shared render service instance.
pub fn render_service() -> Arc<ChatMarkdownRenderer> {
    Arc::clone(&RENDER_SERVICE)
}

/// Render a single message without going through the shared instance.
pub fn render_markdown(markdown: &str) -> String {
    ChatMarkdownRenderer.render(markdown)
}

impl RenderService for ChatMarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let started_at = Instant::now();
        let mut fragments = Fragments::default();

        let html = escape_stage(markdown);
        let html = fence_stage(&html, &mut fragments);
        let html = inline_code_stage(&html, &mut fragments);
        let html = heading_stage(&html);
        let html = emphasis_stage(&html);
        let html = list_stage(&html);
        let html = paragraph_stage(&html);
        let html = restore_stage(&html, &fragments);

        histogram!(METRIC_RENDER_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        trace!(
            target = "application::render::pipeline",
            input_bytes = markdown.len(),
            output_bytes = html.len(),
            fragments = fragments.len(),
            "rendered message"
        );

        html
    }
}

// Escaping runs before any markup is produced; every later stage may assume
// the text holds no literal `<`, `>` or unescaped `&`.
fn escape_stage(markdown: &str) -> String {
    escape::escape_html(markdown)
}

// Fences go before inline code so a triple backtick is never read as three
// single-backtick delimiters.
fn fence_stage(html: &str, fragments: &mut Fragments) -> String {
    blocks::stash_fenced_blocks(html, fragments)
}

// Code spans are stashed before emphasis so `*` inside them stays literal.
fn inline_code_stage(html: &str, fragments: &mut Fragments) -> String {
    inline::stash_code_spans(html, fragments)
}

fn heading_stage(html: &str) -> String {
    blocks::render_headings(html)
}

// Bold consumes `**` pairs first; otherwise each pair would open and close
// an empty italic span.
fn emphasis_stage(html: &str) -> String {
    let bold = inline::render_bold(html);
    inline::render_italic(&bold)
}

fn list_stage(html: &str) -> String {
    let items = blocks::render_list_items(html);
    blocks::wrap_list_runs(&items)
}

fn paragraph_stage(html: &str) -> String {
    blocks::wrap_paragraphs(html)
}

fn restore_stage(html: &str, fragments: &Fragments) -> String {
    fragments.restore(html)
}
