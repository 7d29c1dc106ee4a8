use ratatui::style::Style;
use ratatui::text::Span;

/// Turns a line's pre-rendered content into styled spans for the terminal view.
///
/// The listing never tokenizes code itself; a formatter only interprets markup that is already
/// in the content (for example ANSI escapes, see `code-listing-ansi`).
pub trait LineFormatter {
    fn format_line(&self, content: &str) -> Vec<Span<'static>>;
}

/// Shows content verbatim.
pub struct PlainLines;

impl LineFormatter for PlainLines {
    fn format_line(&self, content: &str) -> Vec<Span<'static>> {
        vec![Span::styled(content.to_string(), Style::default())]
    }
}
