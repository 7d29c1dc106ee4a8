use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::viewport::ViewportState;

const TAB_WIDTH: usize = 4;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    let mut cursor = ClipCursor::new(x, y, start_col, max_cols);
    cursor.put_str(buf, input, style);
}

/// Draws `spans` on one row, skipping the first `start_col` columns and stopping after
/// `max_cols`. Tabs expand to four columns; wide chars are never split.
pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'static>],
    fallback_style: Style,
) {
    let mut cursor = ClipCursor::new(x, y, start_col, max_cols);
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        if !cursor.put_str(buf, span.content.as_ref(), style) {
            return;
        }
    }
}

/// Patches `style` onto every span, keeping the spans' own colors where set.
pub fn patch_spans(spans: Vec<Span<'static>>, style: Style) -> Vec<Span<'static>> {
    spans
        .into_iter()
        .map(|s| {
            let patched = style.patch(s.style);
            Span::styled(s.content, patched)
        })
        .collect()
}

struct ClipCursor {
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl ClipCursor {
    fn new(x: u16, y: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            x,
            y,
            start_col: start_col as usize,
            max_cols: max_cols as usize,
            col: 0,
            out_cols: 0,
        }
    }

    /// Returns `false` once the row is full.
    fn put_str(&mut self, buf: &mut Buffer, input: &str, style: Style) -> bool {
        let mut tmp = [0u8; 4];
        for ch in input.chars() {
            if ch == '\t' {
                for _ in 0..TAB_WIDTH {
                    if !self.put(buf, " ", 1, style) {
                        return false;
                    }
                }
                continue;
            }
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if !self.put(buf, ch.encode_utf8(&mut tmp), w, style) {
                return false;
            }
        }
        true
    }

    fn put(&mut self, buf: &mut Buffer, symbol: &str, w: usize, style: Style) -> bool {
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }
        let dx = self.out_cols as u16;
        if let Some(cell) = buf.cell_mut((self.x + dx, self.y)) {
            cell.set_style(style);
            cell.set_symbol(symbol);
        }
        if w == 2 {
            if let Some(cell) = buf.cell_mut((self.x + dx + 1, self.y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
        }
        self.col += w;
        self.out_cols += w;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::style::Color;

    fn row(buf: &Buffer) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn render_spans_clipped_expands_tabs() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        let spans = vec![Span::raw("\t1")];
        render_spans_clipped(0, 0, 0, 6, &mut buf, &spans, Style::default());
        assert!(row(&buf).starts_with("    1"));
    }

    #[test]
    fn render_str_clipped_skips_and_limits_columns() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        render_str_clipped(0, 0, 2, 3, &mut buf, "abcdef", Style::default());
        assert_eq!(row(&buf), "cde  ");
    }

    #[test]
    fn wide_chars_are_not_split_at_the_edge() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        render_str_clipped(0, 0, 0, 3, &mut buf, "你好", Style::default());
        assert_eq!(buf.cell((0, 0)).map(|c| c.symbol()), Some("你"));
        assert_eq!(buf.cell((2, 0)).map(|c| c.symbol()), Some(" "));
    }

    #[test]
    fn patch_keeps_span_colors() {
        let spans = vec![Span::styled("a", Style::default().fg(Color::Red)), Span::raw("b")];
        let patched = patch_spans(spans, Style::default().bg(Color::Blue));
        assert_eq!(patched[0].style.fg, Some(Color::Red));
        assert_eq!(patched[0].style.bg, Some(Color::Blue));
        assert_eq!(patched[1].style.bg, Some(Color::Blue));
    }

    #[test]
    fn render_scrollbar_does_not_panic() {
        let mut state = ViewportState::default();
        state.set_viewport(10, 5);
        state.set_content(10, 50);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(Rect::new(0, 0, 1, 5), &mut buf, &state, Style::default());
    }
}
