use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    /// Patched onto hovered and pinned lines.
    pub active: Style,
    /// The `[Raw]` control in the buttons bar.
    pub button: Style,
    pub popup_border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            active: Style::default().on_dark_gray(),
            button: Style::default().cyan().bold(),
            popup_border: Style::default().cyan(),
        }
    }
}
