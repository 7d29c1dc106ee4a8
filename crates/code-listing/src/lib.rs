//! Interactive code listings for ratatui apps and HTML pages.
//!
//! This is the facade crate: it re-exports [`code_listing_core`] and feature-gates the optional
//! pieces.
//!
//! - `crossterm`: [`crossterm_input`] converts crossterm events into [`input::InputEvent`]s.
//! - `ansi`: [`ansi::AnsiLines`] keeps ANSI colors of pre-rendered lines.
pub use code_listing_core::input;
pub use code_listing_core::keymap;
pub use code_listing_core::listing;
pub use code_listing_core::markup;
pub use code_listing_core::options;
pub use code_listing_core::popup;
pub use code_listing_core::render;
pub use code_listing_core::scroll;
pub use code_listing_core::text;
pub use code_listing_core::theme;
pub use code_listing_core::view;
pub use code_listing_core::viewport;

#[cfg(feature = "crossterm")]
pub use code_listing_core::crossterm_input;

#[cfg(feature = "ansi")]
pub use code_listing_ansi as ansi;

pub mod help;
