use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Input text has already been escaped when fragments are stashed, so a literal
// `<` can only come from the renderer and placeholders cannot be forged.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(?:pre|code) data-fragment="([0-9]+)"></(?:pre|code)>"#)
        .expect("fragment placeholder pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FragmentKind {
    /// Fenced code block; the placeholder opens with `<pre`.
    Block,
    /// Inline code span; the placeholder opens with `<code`.
    Inline,
}

/// Finished HTML set aside while the remaining stages run, so their patterns
/// never see the contents of code regions.
#[derive(Debug, Default)]
pub(super) struct Fragments {
    html: Vec<String>,
}

impl Fragments {
    /// Store `html` and return the placeholder that stands in for it.
    pub(super) fn stash(&mut self, kind: FragmentKind, html: &str) -> String {
        // A code span may enclose an earlier fence placeholder; expand it now so
        // stored fragments never nest.
        let expanded = self.restore(html);
        let index = self.html.len();
        self.html.push(expanded);

        match kind {
            FragmentKind::Block => format!(r#"<pre data-fragment="{index}"></pre>"#),
            FragmentKind::Inline => format!(r#"<code data-fragment="{index}"></code>"#),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.html.len()
    }

    /// Swap every placeholder in `html` for the fragment it stands in for.
    pub(super) fn restore(&self, html: &str) -> String {
        if self.html.is_empty() {
            return html.to_string();
        }

        PLACEHOLDER
            .replace_all(html, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.html.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
