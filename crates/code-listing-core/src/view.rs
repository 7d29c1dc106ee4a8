use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Span;
use unicode_width::UnicodeWidthStr;

use crate::input::InputEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::keymap::Binding;
use crate::listing::Listing;
use crate::popup::PopupHost;
use crate::popup::PopupRequest;
use crate::render;
use crate::scroll::ScrollBindings;
use crate::text::LineFormatter;
use crate::text::PlainLines;
use crate::theme::Theme;
use crate::viewport::ViewportState;

/// Label of the raw-view control in the buttons bar.
pub const RAW_BUTTON: &str = "[Raw]";

#[derive(Clone, Debug)]
pub struct ListingViewOptions {
    pub show_scrollbar: bool,
    /// Blank cells on each side of the line numbers.
    pub gutter_padding: u16,
    pub scroll: ScrollBindings,
    pub raw_view: Binding,
}

impl Default for ListingViewOptions {
    fn default() -> Self {
        Self {
            show_scrollbar: true,
            gutter_padding: 1,
            scroll: ScrollBindings::default(),
            raw_view: Binding::new("r", "raw view", vec![keymap::key_char('r')]),
        }
    }
}

/// Outcome of feeding an event to a [`ListingView`].
///
/// The view never opens popups itself: `OpenRawRequested` hands the request to the app, which
/// passes it to its [`PopupHost`] (or ignores it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingAction {
    None,
    Redraw,
    OpenRawRequested(PopupRequest),
}

/// Where a point falls inside the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Hit {
    RawButton,
    Line(i64),
    Inside,
    Outside,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Layout {
    buttons: Rect,
    gutter: Rect,
    code: Rect,
    scrollbar: Option<Rect>,
}

/// Terminal rendering of a [`Listing`]: a buttons bar, a line-number gutter and the code column.
///
/// Mouse motion highlights the line under the pointer, a left click pins/unpins it, and moving
/// out of the view clears hover highlighting. Pinned lines stay highlighted.
#[derive(Clone)]
pub struct ListingView {
    listing: Listing,
    pub state: ViewportState,
    options: ListingViewOptions,
    formatter: Arc<dyn LineFormatter + Send + Sync>,
    pointer_inside: bool,
}

impl ListingView {
    pub fn new(listing: Listing) -> Self {
        Self::with_options(listing, ListingViewOptions::default())
    }

    pub fn with_options(listing: Listing, options: ListingViewOptions) -> Self {
        let mut view = Self {
            listing,
            state: ViewportState::default(),
            options,
            formatter: Arc::new(PlainLines),
            pointer_inside: false,
        };
        view.update_content_size();
        view
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing {
        &mut self.listing
    }

    pub fn options(&self) -> &ListingViewOptions {
        &self.options
    }

    pub fn set_formatter(&mut self, formatter: Arc<dyn LineFormatter + Send + Sync>) {
        self.formatter = formatter;
        self.update_content_size();
    }

    /// Opens the raw view through `host`; a refusing host is ignored.
    pub fn open_raw_view(&self, host: &mut dyn PopupHost) {
        self.listing.open_raw_view(host);
    }

    /// Width of the numbering gutter in cells (0 when line numbers are off).
    pub fn gutter_width(&self) -> u16 {
        if !self.listing.options().line_numbers {
            return 0;
        }
        let digits = self.label_width() as u16;
        digits.saturating_add(self.options.gutter_padding.saturating_mul(2))
    }

    fn label_width(&self) -> usize {
        self.listing.options().label_width(self.listing.len())
    }

    pub fn handle_event_in_area(&mut self, area: Rect, event: InputEvent) -> ListingAction {
        match event {
            InputEvent::Paste(_) => ListingAction::None,
            InputEvent::Mouse(m) => self.handle_mouse_event(area, m),
            InputEvent::Key(key) => {
                if self.options.raw_view.matches(&key) {
                    return ListingAction::OpenRawRequested(self.listing.raw_view_request());
                }
                let Some(action) = self.options.scroll.action_for(&key) else {
                    return ListingAction::None;
                };
                self.set_viewport(area);
                self.options.scroll.apply(&mut self.state, action);
                ListingAction::Redraw
            }
        }
    }

    pub fn handle_mouse_event(&mut self, area: Rect, event: MouseEvent) -> ListingAction {
        self.set_viewport(area);
        let hit = self.hit_test(area, event.x, event.y);

        if hit == Hit::Outside {
            if !self.pointer_inside {
                return ListingAction::None;
            }
            self.pointer_inside = false;
            return redraw_if(self.listing.leave());
        }
        self.pointer_inside = true;

        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_under_pointer(area, event, -3),
            MouseEventKind::ScrollDown => self.scroll_under_pointer(area, event, 3),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => match hit {
                Hit::Line(index) => redraw_if(self.listing.hover(index)),
                _ => ListingAction::None,
            },
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Hit::RawButton => {
                    ListingAction::OpenRawRequested(self.listing.raw_view_request())
                }
                Hit::Line(index) => {
                    let hovered = self.listing.hover(index);
                    redraw_if(self.listing.click(index) || hovered)
                }
                _ => ListingAction::None,
            },
            _ => ListingAction::None,
        }
    }

    /// Scrolls, then hovers whatever line moved under the still pointer.
    fn scroll_under_pointer(&mut self, area: Rect, event: MouseEvent, delta: i32) -> ListingAction {
        self.state.scroll_y_by(delta);
        if let Hit::Line(index) = self.hit_test(area, event.x, event.y) {
            self.listing.hover(index);
        }
        ListingAction::Redraw
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.set_viewport(area);
        let layout = self.layout(area);

        buf.set_style(layout.buttons, theme.text_primary);
        let button_w = RAW_BUTTON.width() as u16;
        let button_x = layout.buttons.right().saturating_sub(button_w).max(layout.buttons.x);
        render::render_str_clipped(
            button_x,
            layout.buttons.y,
            0,
            layout.buttons.right() - button_x,
            buf,
            RAW_BUTTON,
            theme.button,
        );

        let gutter_digits = self.label_width();
        for row in 0..layout.code.height {
            let y = layout.code.y + row;
            let pos = (self.state.y as usize).saturating_add(row as usize);
            let line = self.listing.lines().get(pos);
            let active = line.is_some_and(|l| self.listing.is_active(l.index()));
            let row_style = if active {
                theme.text_primary.patch(theme.active)
            } else {
                theme.text_primary
            };

            if layout.gutter.width > 0 {
                let gutter_style = if active {
                    theme.text_muted.patch(theme.active)
                } else {
                    theme.text_muted
                };
                let gutter_row = Rect::new(layout.gutter.x, y, layout.gutter.width, 1);
                buf.set_style(gutter_row, gutter_style);
                if let Some(line) = line {
                    let label = format!(
                        "{:>digits$}",
                        line.index(),
                        digits = gutter_digits
                    );
                    let pad = self.options.gutter_padding.min(layout.gutter.width);
                    render::render_str_clipped(
                        layout.gutter.x + pad,
                        y,
                        0,
                        layout.gutter.width - pad,
                        buf,
                        &label,
                        gutter_style,
                    );
                }
            }

            buf.set_style(Rect::new(layout.code.x, y, layout.code.width, 1), row_style);
            let Some(line) = line else {
                continue;
            };
            let mut spans = self.formatter.format_line(line.content());
            if active {
                spans = render::patch_spans(spans, theme.active);
            }
            render::render_spans_clipped(
                layout.code.x,
                y,
                self.state.x,
                layout.code.width,
                buf,
                &spans,
                row_style,
            );
        }

        if let Some(sb) = layout.scrollbar {
            render::render_scrollbar(sb, buf, &self.state, theme.text_muted);
        }
    }

    fn set_viewport(&mut self, area: Rect) {
        let layout = self.layout(area);
        self.state.set_viewport(layout.code.width, layout.code.height);
    }

    fn update_content_size(&mut self) {
        let w = self
            .listing
            .lines()
            .iter()
            .map(|l| spans_width(&self.formatter.format_line(l.content())))
            .max()
            .unwrap_or(0);
        self.state.set_content(w, self.listing.len() as u32);
    }

    fn layout(&self, area: Rect) -> Layout {
        let buttons = Rect::new(area.x, area.y, area.width, area.height.min(1));
        let body = Rect::new(
            area.x,
            area.y + buttons.height,
            area.width,
            area.height - buttons.height,
        );
        let (content, scrollbar) = if self.options.show_scrollbar && body.width >= 2 {
            (
                Rect::new(body.x, body.y, body.width - 1, body.height),
                Some(Rect::new(body.right() - 1, body.y, 1, body.height)),
            )
        } else {
            (body, None)
        };
        let gutter_w = self.gutter_width().min(content.width);
        Layout {
            buttons,
            gutter: Rect::new(content.x, content.y, gutter_w, content.height),
            code: Rect::new(
                content.x + gutter_w,
                content.y,
                content.width - gutter_w,
                content.height,
            ),
            scrollbar,
        }
    }

    fn hit_test(&self, area: Rect, x: u16, y: u16) -> Hit {
        if !contains(area, x, y) {
            return Hit::Outside;
        }
        let layout = self.layout(area);
        if contains(layout.buttons, x, y) {
            let button_w = RAW_BUTTON.width() as u16;
            if x >= layout.buttons.right().saturating_sub(button_w) {
                return Hit::RawButton;
            }
            return Hit::Inside;
        }
        let row_hit = contains(layout.gutter, x, y) || contains(layout.code, x, y);
        if !row_hit {
            return Hit::Inside;
        }
        let pos = (self.state.y as usize).saturating_add((y - layout.code.y) as usize);
        match self.listing.lines().get(pos) {
            Some(line) => Hit::Line(line.index()),
            None => Hit::Inside,
        }
    }
}

fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

fn redraw_if(changed: bool) -> ListingAction {
    if changed {
        ListingAction::Redraw
    } else {
        ListingAction::None
    }
}

fn spans_width(spans: &[Span<'static>]) -> u32 {
    spans
        .iter()
        .map(|s| s.content.replace('\t', "    ").width() as u32)
        .sum()
}
