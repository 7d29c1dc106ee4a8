//! Popup windows for the raw view.
//!
//! A [`PopupHost`] decides whether a popup may open. [`Popups`] is the in-memory host used by the
//! terminal front-end: popups are keyed by name, so reopening a name replaces that popup's
//! content instead of stacking a second one.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;

use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseEventKind;
use crate::keymap;
use crate::scroll::ScrollBindings;
use crate::theme::Theme;
use crate::viewport;
use crate::viewport::ViewportOptions;
use crate::viewport::ViewportState;

/// Logical name shared by every listing's raw view.
pub const RAW_POPUP_NAME: &str = "RawCode";
pub const RAW_POPUP_TITLE: &str = "Raw code view";
pub const RAW_POPUP_WIDTH: u16 = 640;
pub const RAW_POPUP_HEIGHT: u16 = 480;

/// Pixel size of one terminal cell when mapping popup sizes to the terminal.
pub const CELL_PX: (u16, u16) = (8, 16);

/// A request to open (or reuse) a named popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupRequest {
    pub name: &'static str,
    pub title: String,
    /// Width in px.
    pub width: u16,
    /// Height in px.
    pub height: u16,
    pub body: String,
}

impl PopupRequest {
    pub fn raw_view(body: String) -> Self {
        Self {
            name: RAW_POPUP_NAME,
            title: RAW_POPUP_TITLE.to_string(),
            width: RAW_POPUP_WIDTH,
            height: RAW_POPUP_HEIGHT,
            body,
        }
    }

    /// Window features string, as passed to a browser's `window.open`.
    pub fn features(&self) -> String {
        format!("width={}, height={}", self.width, self.height)
    }
}

pub trait PopupHost {
    /// Opens the popup named by `request`, or reuses it if already open.
    ///
    /// Returns `None` when the host refuses to open popups.
    fn open(&mut self, request: &PopupRequest) -> Option<&mut PopupWindow>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PopupAction {
    None,
    Redraw,
    Close,
}

/// A single open popup and its scroll position.
#[derive(Clone, Debug)]
pub struct PopupWindow {
    name: &'static str,
    title: String,
    width: u16,
    height: u16,
    body: String,
    lines: Vec<String>,
    pub state: ViewportState,
    scroll: ScrollBindings,
    close: Vec<KeyEvent>,
}

impl PopupWindow {
    fn new(request: &PopupRequest) -> Self {
        let mut window = Self {
            name: request.name,
            title: String::new(),
            width: 0,
            height: 0,
            body: String::new(),
            lines: Vec::new(),
            state: ViewportState::default(),
            scroll: ScrollBindings::default(),
            close: vec![KeyEvent::new(KeyCode::Esc), keymap::key_char('q')],
        };
        window.write(request);
        window
    }

    /// Replaces the popup's document with `request`'s content.
    fn write(&mut self, request: &PopupRequest) {
        self.title = request.title.clone();
        self.width = request.width;
        self.height = request.height;
        self.body = request.body.clone();
        self.lines = request.body.split('\n').map(str::to_string).collect();
        let content_w = self
            .lines
            .iter()
            .map(|l| unicode_width::UnicodeWidthStr::width(l.as_str()) as u32)
            .max()
            .unwrap_or(0);
        self.state = ViewportState::default();
        self.state.set_content(content_w, self.lines.len() as u32);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Browser document for this popup: the body inside a `<pre>` block, unescaped.
    pub fn document(&self) -> String {
        format!("<pre>{}</pre>", self.body)
    }

    /// Where the popup lands inside `area`: centered, clamped to fit.
    pub fn area_in(&self, area: Rect) -> Rect {
        let w = (self.width / CELL_PX.0).max(3).min(area.width);
        let h = (self.height / CELL_PX.1).max(3).min(area.height);
        Rect::new(
            area.x + (area.width - w) / 2,
            area.y + (area.height - h) / 2,
            w,
            h,
        )
    }

    pub fn handle_event(&mut self, event: InputEvent) -> PopupAction {
        match event {
            InputEvent::Paste(_) => PopupAction::None,
            InputEvent::Mouse(m) => match m.kind {
                MouseEventKind::ScrollUp => {
                    self.state.scroll_y_by(-3);
                    PopupAction::Redraw
                }
                MouseEventKind::ScrollDown => {
                    self.state.scroll_y_by(3);
                    PopupAction::Redraw
                }
                _ => PopupAction::None,
            },
            InputEvent::Key(key) => {
                if self.close.iter().any(|p| keymap::key_event_matches(p, &key)) {
                    return PopupAction::Close;
                }
                let Some(action) = self.scroll.action_for(&key) else {
                    return PopupAction::None;
                };
                self.scroll.apply(&mut self.state, action);
                PopupAction::Redraw
            }
        }
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let popup = self.area_in(area);
        if popup.width == 0 || popup.height == 0 {
            return;
        }

        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.clone())
            .border_style(theme.popup_border);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let show_scrollbar = inner.width >= 2;
        let text_w = if show_scrollbar {
            inner.width - 1
        } else {
            inner.width
        };
        self.state.set_viewport(text_w, inner.height);
        viewport::render_lines_with_options(
            inner,
            buf,
            &self.lines,
            &self.state,
            &ViewportOptions {
                style: theme.text_primary,
                show_scrollbar,
                scrollbar_style: theme.text_muted,
            },
        );
    }
}

/// In-memory popup host keyed by popup name.
#[derive(Clone, Debug, Default)]
pub struct Popups {
    windows: Vec<PopupWindow>,
    blocked: bool,
}

impl Popups {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that refuses every popup.
    pub fn blocked() -> Self {
        Self {
            windows: Vec::new(),
            blocked: true,
        }
    }

    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PopupWindow> {
        self.windows.iter().find(|w| w.name == name)
    }

    /// The most recently opened popup, which receives input.
    pub fn top_mut(&mut self) -> Option<&mut PopupWindow> {
        self.windows.last_mut()
    }

    pub fn close(&mut self, name: &str) {
        self.windows.retain(|w| w.name != name);
    }

    /// Routes `event` to the top popup. Returns `None` when no popup is open.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<PopupAction> {
        let top = self.windows.last_mut()?;
        let action = top.handle_event(event);
        if action == PopupAction::Close {
            let name = top.name;
            self.close(name);
        }
        Some(action)
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        for window in &mut self.windows {
            window.render_ref(area, buf, theme);
        }
    }
}

impl PopupHost for Popups {
    fn open(&mut self, request: &PopupRequest) -> Option<&mut PopupWindow> {
        if self.blocked {
            return None;
        }
        match self.windows.iter().position(|w| w.name == request.name) {
            Some(pos) => {
                let mut window = self.windows.remove(pos);
                window.write(request);
                self.windows.push(window);
            }
            None => self.windows.push(PopupWindow::new(request)),
        }
        tracing::debug!(name = request.name, "popup opened");
        self.windows.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn reopening_a_name_replaces_content() {
        let mut popups = Popups::new();
        popups.open(&PopupRequest::raw_view("a".to_string()));
        popups.open(&PopupRequest::raw_view("b\nc".to_string()));
        assert_eq!(popups.len(), 1);
        let window = popups.get(RAW_POPUP_NAME).expect("open");
        assert_eq!(window.body(), "b\nc");
        assert_eq!(window.document(), "<pre>b\nc</pre>");
        assert_eq!(window.title(), RAW_POPUP_TITLE);
    }

    #[test]
    fn features_match_fixed_size() {
        let request = PopupRequest::raw_view(String::new());
        assert_eq!(request.features(), "width=640, height=480");
    }

    #[test]
    fn escape_closes_the_top_popup() {
        let mut popups = Popups::new();
        assert_eq!(popups.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Esc))), None);
        popups.open(&PopupRequest::raw_view("x".to_string()));
        let action = popups.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Esc)));
        assert_eq!(action, Some(PopupAction::Close));
        assert!(popups.is_empty());
    }

    #[test]
    fn renders_centered_with_title_and_body() {
        let mut popups = Popups::new();
        popups.open(&PopupRequest::raw_view("<b>raw</b>".to_string()));
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(area);
        popups.render_ref(area, &mut buf, &Theme::default());

        let window = popups.get(RAW_POPUP_NAME).expect("open");
        let popup = window.area_in(area);
        assert_eq!((popup.width, popup.height), (80, 30));
        assert!(row(&buf, popup.y).contains(RAW_POPUP_TITLE));
        assert!(row(&buf, popup.y + 1).contains("<b>raw</b>"));
    }

    #[test]
    fn popup_is_clamped_to_small_areas() {
        let mut popups = Popups::new();
        popups.open(&PopupRequest::raw_view("x".to_string()));
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        popups.render_ref(area, &mut buf, &Theme::default());
        let popup = popups.get(RAW_POPUP_NAME).expect("open").area_in(area);
        assert_eq!(popup, area);
    }
}
