/// Escape the characters that can open or close markup. `&` is replaced first
/// so the entities produced for `<` and `>` are not escaped a second time.
pub(super) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
