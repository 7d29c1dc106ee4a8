//! ANSI-styled listing content.
//!
//! Lines that were rendered by an external highlighter (`bat`, `pygmentize -f terminal`, ...)
//! keep their colors in the terminal view when the listing uses [`AnsiLines`].

use ansi_to_tui::IntoText;
use code_listing_core::text::LineFormatter;
use ratatui::text::Line;
use ratatui::text::Span;

/// Parses one line of ANSI-escaped text; malformed escapes fall back to the literal text.
pub fn ansi_line(input: &str) -> Line<'static> {
    match input.into_text() {
        Ok(text) => text.lines.into_iter().next().unwrap_or_default(),
        Err(_) => Line::from(input.to_string()),
    }
}

/// A [`LineFormatter`] that interprets ANSI escape sequences.
pub struct AnsiLines;

impl LineFormatter for AnsiLines {
    fn format_line(&self, content: &str) -> Vec<Span<'static>> {
        let line = ansi_line(content);
        let line_style = line.style;
        line.spans
            .into_iter()
            .map(|s| {
                let style = line_style.patch(s.style);
                Span::styled(s.content, style)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn escapes_become_styles() {
        let spans = AnsiLines.format_line("\u{1b}[31mred\u{1b}[0m plain");
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "red plain");
        let red = spans
            .iter()
            .find(|s| s.content.as_ref() == "red")
            .expect("red span");
        assert_eq!(red.style.fg, Some(Color::Red));
    }

    #[test]
    fn plain_text_passes_through() {
        let spans = AnsiLines.format_line("fn main() {}");
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "fn main() {}");
    }
}
