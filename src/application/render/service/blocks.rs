use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::fragments::{FragmentKind, Fragments};

// Block patterns match one line body at a time. Lines end at `\n` only; a
// trailing `\r` is split off before matching and put back afterwards.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("fence pattern must compile"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("heading pattern must compile"));
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:-|[0-9]+\.)[ \t]+(.*)$").expect("list item pattern must compile")
});

/// Line prefixes that mark a line as already being a block. The test is purely
/// textual, so a paragraph that opens with inline markup (`<strong`, `<em`,
/// `<code`) is also left unwrapped.
const BLOCK_OPENERS: [&str; 7] = ["<h", "<ul", "<pre", "<li", "<code", "<strong", "<em"];

/// Replace every fenced region with a `<pre><code>` fragment. Anything after
/// the opening fence, a language tag included, is kept as content.
pub(super) fn stash_fenced_blocks(html: &str, fragments: &mut Fragments) -> String {
    FENCE
        .replace_all(html, |caps: &Captures<'_>| {
            let block = format!("<pre><code>{}</code></pre>", caps[1].trim());
            fragments.stash(FragmentKind::Block, &block)
        })
        .into_owned()
}

/// The greedy `#{1,6}` run gives six-hash headings precedence over shorter
/// ones; seven or more hashes never form a heading.
pub(super) fn render_headings(html: &str) -> String {
    map_lines(html, |body| {
        HEADING.captures(body).map(|caps: Captures<'_>| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", &caps[2])
        })
    })
}

/// Turn `- item` and `1. item` lines into `<li>` elements. Numbering is not
/// preserved.
pub(super) fn render_list_items(html: &str) -> String {
    map_lines(html, |body| {
        LIST_ITEM
            .captures(body)
            .map(|caps: Captures<'_>| format!("<li>{}</li>", &caps[1]))
    })
}

/// Wrap each run of `<li>` lines in a single `<ul>`, collapsed onto one line.
/// Blank lines between two items belong to the run and are dropped; blank
/// lines after the last item are kept.
pub(super) fn wrap_list_runs(html: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut gap: Vec<&str> = Vec::new();

    for line in html.split('\n') {
        let (body, _) = split_line_ending(line);
        if is_list_item(body) {
            gap.clear();
            run.push(body);
        } else if !run.is_empty() && body.trim().is_empty() {
            gap.push(line);
        } else {
            flush_list_run(&mut lines, &mut run);
            lines.extend(gap.drain(..).map(str::to_string));
            lines.push(line.to_string());
        }
    }
    flush_list_run(&mut lines, &mut run);
    lines.extend(gap.drain(..).map(str::to_string));

    lines.join("\n")
}

fn flush_list_run(lines: &mut Vec<String>, run: &mut Vec<&str>) {
    if run.is_empty() {
        return;
    }
    lines.push(format!("<ul>{}</ul>", run.concat()));
    run.clear();
}

fn is_list_item(line: &str) -> bool {
    line.starts_with("<li>") && line.ends_with("</li>")
}

/// Wrap every non-empty line that does not open with a block tag in `<p>`.
/// Whitespace-only lines count as content.
pub(super) fn wrap_paragraphs(html: &str) -> String {
    map_lines(html, |body| {
        (!body.is_empty() && !starts_with_block(body)).then(|| format!("<p>{body}</p>"))
    })
}

/// Rewrite each line body with `rewrite`, leaving lines it declines untouched.
/// The line ending stays outside whatever markup the rewrite produces.
fn map_lines<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    html.split('\n')
        .map(|line| {
            let (body, ending) = split_line_ending(line);
            match rewrite(body) {
                Some(rewritten) => format!("{rewritten}{ending}"),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn starts_with_block(line: &str) -> bool {
    BLOCK_OPENERS.iter().any(|opener| line.starts_with(opener))
}

fn split_line_ending(line: &str) -> (&str, &str) {
    match line.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (line, ""),
    }
}
