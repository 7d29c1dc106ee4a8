//! `code-listing-core` turns a block of pre-rendered source lines into an interactive listing:
//! a line-number gutter, a code column, hover highlighting, pinned lines and a raw view.
//!
//! The crate is split into a headless model and two front-ends:
//!
//! - [`listing::Listing`]: lines, options and the hover/pin state machine.
//! - [`markup`]: HTML output (`.listing`, `.numbering`, `.code`, `span[data-line]`, `.active`)
//!   for browser hosts.
//! - [`view::ListingView`]: a ratatui component driven by [`input::InputEvent`]s.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - No async runtime: everything runs synchronously on the caller's thread.
//! - Popups are app-controlled: the view emits [`view::ListingAction::OpenRawRequested`] and the
//!   caller hands it to a [`popup::PopupHost`] (for example [`popup::Popups`]).
//! - Bad configuration never aborts: [`options::ListingOptions::resolve`] keeps defaults for
//!   unusable overrides and reports them as [`options::OptionIssue`]s.
//!
//! ## Getting started
//!
//! ```
//! use code_listing_core::listing::Listing;
//! use code_listing_core::options::ListingOptions;
//!
//! let mut listing = Listing::new("foo\nbar\nbaz", ListingOptions::default());
//! listing.click(2);
//! assert_eq!(listing.persistent_lines().collect::<Vec<_>>(), vec![2]);
//! assert_eq!(listing.raw_text(), "foo\nbar\nbaz");
//! ```
pub mod theme;

pub mod text;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod scroll;
pub mod viewport;

pub mod options;

pub mod listing;
pub mod markup;
pub mod popup;

pub mod input;
pub mod keymap;
pub mod view;
