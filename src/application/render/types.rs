/// Trait exposed by the rendering pipeline. Implementations must be total and
/// deterministic: every input renders, and the same input always yields the
/// same markup.
pub trait RenderService: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}
