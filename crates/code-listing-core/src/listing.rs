use std::collections::BTreeSet;

use serde_json::Value;

use crate::options::ListingOptions;
use crate::options::OptionIssue;
use crate::popup::PopupHost;
use crate::popup::PopupRequest;

/// One newline-delimited segment of the listing content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingLine {
    index: i64,
    content: String,
}

impl ListingLine {
    /// Display index, assigned at construction.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// The line's content, exactly as supplied.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Headless listing state: lines, pinned lines and which lines are highlighted.
///
/// Front-ends ([`crate::markup`], [`crate::view::ListingView`]) read this model and forward
/// pointer interaction to [`Listing::hover`], [`Listing::click`] and [`Listing::leave`].
#[derive(Clone, Debug)]
pub struct Listing {
    options: ListingOptions,
    lines: Vec<ListingLine>,
    persistent: BTreeSet<i64>,
    active: BTreeSet<i64>,
}

impl Listing {
    /// Builds a listing. A `numbering_start` too close to `i64::MAX` for the line count is
    /// lowered so that every line keeps a distinct index.
    pub fn new(content: &str, mut options: ListingOptions) -> Self {
        let segments = split_lines(content);
        if !options.fits_line_count(segments.len()) {
            let fitted = i64::MAX - (segments.len() - 1) as i64;
            tracing::warn!(
                start = options.numbering_start,
                fitted,
                "numbering start lowered to fit every line"
            );
            options.numbering_start = fitted;
        }
        let lines = segments
            .into_iter()
            .enumerate()
            .map(|(i, content)| ListingLine {
                index: options.numbering_start.saturating_add(i as i64),
                content,
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            lines = lines.len(),
            start = options.numbering_start,
            "listing created"
        );
        Self {
            options,
            lines,
            persistent: BTreeSet::new(),
            active: BTreeSet::new(),
        }
    }

    /// Builds a listing from caller overrides; unusable overrides are returned, not fatal.
    pub fn with_overrides(content: &str, overrides: &Value) -> (Self, Vec<OptionIssue>) {
        let (mut options, mut issues) = ListingOptions::resolve(overrides);
        let line_count = content.split('\n').count();
        if !options.fits_line_count(line_count) {
            let issue = OptionIssue::OutOfRange {
                key: "numberingStart",
                found: options.numbering_start.to_string(),
            };
            tracing::warn!(%issue, "listing option ignored");
            issues.push(issue);
            options.numbering_start = ListingOptions::default().numbering_start;
        }
        (Self::new(content, options), issues)
    }

    pub fn options(&self) -> &ListingOptions {
        &self.options
    }

    pub fn lines(&self) -> &[ListingLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the first line.
    pub fn first_index(&self) -> i64 {
        self.options.numbering_start
    }

    /// Index of the last line.
    pub fn last_index(&self) -> i64 {
        crate::options::highest_index(self.options.numbering_start, self.lines.len())
    }

    /// Position in [`Listing::lines`] of the line displayed as `index`.
    pub fn position_of(&self, index: i64) -> Option<usize> {
        let offset = index.checked_sub(self.options.numbering_start)?;
        let pos = usize::try_from(offset).ok()?;
        (pos < self.lines.len()).then_some(pos)
    }

    pub fn line(&self, index: i64) -> Option<&ListingLine> {
        self.position_of(index).map(|pos| &self.lines[pos])
    }

    pub fn contains(&self, index: i64) -> bool {
        self.position_of(index).is_some()
    }

    /// Width of the numbering column in px.
    pub fn numbering_width(&self) -> u32 {
        self.options.numbering_width(self.lines.len())
    }

    pub fn is_active(&self, index: i64) -> bool {
        self.active.contains(&index)
    }

    pub fn is_persistent(&self, index: i64) -> bool {
        self.persistent.contains(&index)
    }

    pub fn active_lines(&self) -> impl Iterator<Item = i64> + '_ {
        self.active.iter().copied()
    }

    pub fn persistent_lines(&self) -> impl Iterator<Item = i64> + '_ {
        self.persistent.iter().copied()
    }

    /// Pointer entered line `index`: only pinned lines and `index` stay active.
    ///
    /// Returns `true` if any line changed state.
    pub fn hover(&mut self, index: i64) -> bool {
        if !self.options.interactive || !self.contains(index) {
            return false;
        }
        let mut changed = self.clear_active();
        changed |= self.active.insert(index);
        if changed {
            tracing::trace!(line = index, "hover");
        }
        changed
    }

    /// Pointer left the listing: only pinned lines stay active.
    pub fn leave(&mut self) -> bool {
        if !self.options.interactive {
            return false;
        }
        let changed = self.clear_active();
        if changed {
            tracing::trace!("pointer left listing");
        }
        changed
    }

    /// Toggles whether `index` is pinned. The line is active afterwards either way.
    pub fn click(&mut self, index: i64) -> bool {
        if !self.options.interactive || !self.contains(index) {
            return false;
        }
        let pinned = if self.persistent.remove(&index) {
            false
        } else {
            self.persistent.insert(index);
            true
        };
        self.active.insert(index);
        tracing::trace!(line = index, pinned, "toggled persistent line");
        true
    }

    /// All lines rejoined with `'\n'`; equal to the content the listing was built from.
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.content);
        }
        out
    }

    pub fn raw_view_request(&self) -> PopupRequest {
        PopupRequest::raw_view(self.raw_text())
    }

    /// Opens or reuses the shared raw-view popup. A blocked popup is silently ignored.
    pub fn open_raw_view(&self, host: &mut dyn PopupHost) {
        let request = self.raw_view_request();
        if host.open(&request).is_none() {
            tracing::debug!(name = request.name, "raw view popup blocked");
        }
    }

    fn clear_active(&mut self) -> bool {
        let before = self.active.len();
        let persistent = &self.persistent;
        self.active.retain(|i| persistent.contains(i));
        before != self.active.len()
    }
}

/// Splits on `'\n'` only; empty leading/trailing segments are kept.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::Popups;
    use serde_json::json;

    fn sample() -> Listing {
        Listing::new("foo\nbar\nbaz", ListingOptions::default())
    }

    #[test]
    fn indices_follow_numbering_start() {
        let listing = sample();
        let indices = listing.lines().iter().map(|l| l.index()).collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(listing.line(2).map(|l| l.content()), Some("bar"));
        assert_eq!(listing.line(0), None);
        assert_eq!(listing.line(4), None);

        let listing = Listing::new(
            "a\nb",
            ListingOptions {
                numbering_start: -1,
                ..ListingOptions::default()
            },
        );
        assert_eq!(listing.first_index(), -1);
        assert_eq!(listing.last_index(), 0);
        assert_eq!(listing.position_of(0), Some(1));
    }

    #[test]
    fn split_keeps_empty_segments() {
        assert_eq!(split_lines("\na\n"), vec!["", "a", ""]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(Listing::new("", ListingOptions::default()).len(), 1);
    }

    #[test]
    fn raw_text_round_trips_content() {
        for content in ["foo\nbar\nbaz", "", "\n\n", "<b>x</b>\r\n  y\n"] {
            let listing = Listing::new(content, ListingOptions::default());
            assert_eq!(listing.raw_text(), content);
        }
    }

    #[test]
    fn clicking_twice_unpins() {
        let mut listing = sample();
        listing.click(2);
        assert_eq!(listing.persistent_lines().collect::<Vec<_>>(), vec![2]);
        listing.click(2);
        assert_eq!(listing.persistent_lines().count(), 0);
        assert!(listing.is_active(2));
    }

    #[test]
    fn hover_keeps_a_single_unpinned_line_active() {
        let mut listing = sample();
        assert!(listing.hover(1));
        assert!(listing.hover(3));
        assert_eq!(listing.active_lines().collect::<Vec<_>>(), vec![3]);
        assert!(!listing.hover(3));
    }

    #[test]
    fn pinned_line_survives_hover_and_leave() {
        let mut listing = sample();
        listing.click(1);
        listing.hover(2);
        assert_eq!(listing.active_lines().collect::<Vec<_>>(), vec![1, 2]);
        assert!(listing.leave());
        assert!(listing.is_active(1));
        assert!(!listing.is_active(2));
        assert!(!listing.leave());
    }

    #[test]
    fn multiple_lines_can_be_pinned() {
        let mut listing = sample();
        listing.click(3);
        listing.click(1);
        listing.leave();
        assert_eq!(listing.persistent_lines().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(listing.active_lines().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn unknown_lines_and_disabled_interaction_are_ignored() {
        let mut listing = sample();
        assert!(!listing.click(9));
        assert!(!listing.hover(0));
        assert_eq!(listing.persistent_lines().count(), 0);

        let (mut listing, issues) = Listing::with_overrides("a\nb", &json!({ "interactive": false }));
        assert!(issues.is_empty());
        assert!(!listing.hover(1));
        assert!(!listing.click(1));
        assert_eq!(listing.active_lines().count(), 0);
    }

    #[test]
    fn malformed_overrides_still_build_a_listing() {
        let (listing, issues) =
            Listing::with_overrides("a\nb", &json!({ "numberingStart": "first" }));
        assert_eq!(issues.len(), 1);
        assert_eq!(listing.first_index(), 1);
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn indices_stay_distinct_at_the_top_of_the_range() {
        let options = ListingOptions {
            numbering_start: i64::MAX,
            ..ListingOptions::default()
        };
        let mut listing = Listing::new("a\nb", options);
        assert_eq!(listing.first_index(), i64::MAX - 1);
        assert_eq!(listing.last_index(), i64::MAX);
        assert!(listing.click(i64::MAX));
        assert_eq!(listing.line(i64::MAX).map(|l| l.content()), Some("b"));

        let (listing, issues) =
            Listing::with_overrides("a\nb", &json!({ "numberingStart": i64::MAX }));
        assert_eq!(
            issues,
            vec![OptionIssue::OutOfRange {
                key: "numberingStart",
                found: i64::MAX.to_string(),
            }]
        );
        assert_eq!(listing.first_index(), 1);

        let (listing, issues) =
            Listing::with_overrides("only", &json!({ "numberingStart": i64::MAX }));
        assert!(issues.is_empty());
        assert_eq!(listing.first_index(), i64::MAX);
    }

    #[test]
    fn raw_view_reuses_the_shared_popup() {
        let mut popups = Popups::new();
        sample().open_raw_view(&mut popups);
        Listing::new("other", ListingOptions::default()).open_raw_view(&mut popups);
        assert_eq!(popups.len(), 1);
        let popup = popups.get(crate::popup::RAW_POPUP_NAME).expect("popup open");
        assert_eq!(popup.body(), "other");

        let mut blocked = Popups::blocked();
        sample().open_raw_view(&mut blocked);
        assert!(blocked.is_empty());
    }
}
