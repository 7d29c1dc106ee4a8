use crate::keymap::Binding;
use crate::render;
use crate::view::ListingViewOptions;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Clone, Debug)]
pub struct HelpBarOptions {
    pub style: Style,
    pub key_style: Style,
    pub separator: String,
    pub space: String,
}

impl Default for HelpBarOptions {
    fn default() -> Self {
        Self {
            style: Style::default(),
            key_style: Style::default(),
            separator: " • ".to_string(),
            space: " ".to_string(),
        }
    }
}

/// One-line summary of key bindings, e.g. `r raw view • q quit`.
#[derive(Clone, Debug, Default)]
pub struct HelpBar {
    bindings: Vec<Binding>,
    options: HelpBarOptions,
}

impl HelpBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            options: HelpBarOptions::default(),
        }
    }

    pub fn with_options(bindings: Vec<Binding>, options: HelpBarOptions) -> Self {
        Self { bindings, options }
    }

    /// Help for a [`ListingView`](crate::view::ListingView): its raw-view binding followed by
    /// the app's own bindings.
    pub fn for_listing(view: &ListingViewOptions, app: Vec<Binding>) -> Self {
        let mut bindings = vec![view.raw_view.clone()];
        bindings.extend(app);
        Self::new(bindings)
    }

    pub fn set_bindings(&mut self, bindings: Vec<Binding>) {
        self.bindings = bindings;
    }

    pub fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let spans = self.to_spans();
        buf.set_style(area, self.options.style);
        render::render_spans_clipped(
            area.x,
            area.y,
            0,
            area.width,
            buf,
            &spans,
            self.options.style,
        );
    }

    fn to_spans(&self) -> Vec<Span<'static>> {
        let o = &self.options;
        self.bindings
            .iter()
            .enumerate()
            .flat_map(|(i, b)| {
                let sep = (i > 0).then(|| Span::styled(o.separator.clone(), o.style));
                sep.into_iter().chain([
                    Span::styled(b.help_key.clone(), o.key_style),
                    Span::styled(o.space.clone(), o.style),
                    Span::styled(b.help_desc.clone(), o.style),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap;
    use ratatui::buffer::Buffer;

    #[test]
    fn help_bar_lists_listing_bindings() {
        let hb = HelpBar::for_listing(
            &ListingViewOptions::default(),
            vec![keymap::Binding::new("q", "quit", vec![keymap::key_char('q')])],
        );
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        hb.render_ref(Rect::new(0, 0, 20, 1), &mut buf);
        let row: String = (0..20)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol()).unwrap_or(" "))
            .collect();
        assert_eq!(row, "r raw view • q quit ");
    }

    #[test]
    fn help_bar_renders_narrow_width() {
        let hb = HelpBar::new(vec![keymap::Binding::new(
            "q",
            "quit",
            vec![keymap::key_char('q')],
        )]);
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        hb.render_ref(Rect::new(0, 0, 3, 1), &mut buf);
    }
}
