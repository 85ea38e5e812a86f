use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::fragments::{FragmentKind, Fragments};

// A code span may cross line breaks; emphasis stays on one line.
static CODE_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("code span pattern must compile"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern must compile"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern must compile"));

/// Replace single-backtick spans with `<code>` fragments. The content is
/// already escaped and is copied verbatim.
pub(super) fn stash_code_spans(html: &str, fragments: &mut Fragments) -> String {
    CODE_SPAN
        .replace_all(html, |caps: &Captures<'_>| {
            let span = format!("<code>{}</code>", &caps[1]);
            fragments.stash(FragmentKind::Inline, &span)
        })
        .into_owned()
}

pub(super) fn render_bold(html: &str) -> String {
    BOLD.replace_all(html, "<strong>$1</strong>").into_owned()
}

pub(super) fn render_italic(html: &str) -> String {
    ITALIC.replace_all(html, "<em>$1</em>").into_owned()
}
