//! HTML rendering of a [`Listing`] for browser hosts.
//!
//! Produces the class/attribute contract styled by [`listing_css`]:
//! `.listing > .buttons > a.raw`, `.numbering > span[data-line]`, `.code > span[data-line]`, and
//! `.active` on highlighted lines. Line content is inserted as-is; it is expected to be
//! pre-rendered HTML.

use std::fmt::Write;

use crate::listing::Listing;
use crate::options::LINE_ATTR;
use crate::popup::PopupRequest;

pub const RAW_LABEL: &str = "Raw";
pub const RAW_HINT: &str = "View raw code in popup window";

/// Renders the listing, container included.
pub fn render_html(listing: &Listing) -> String {
    let options = listing.options();
    let width = listing.numbering_width();
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<div class="{}"><div class="listing">"#,
        escape(&options.class_name)
    );
    let _ = write!(
        out,
        r#"<div class="buttons"><a class="raw" title="{}">{}</a></div>"#,
        escape(RAW_HINT),
        escape(RAW_LABEL)
    );

    if options.line_numbers {
        let _ = write!(out, r#"<div class="numbering" style="width: {width}px;">"#);
        for line in listing.lines() {
            let index = line.index();
            open_line(&mut out, listing, index);
            let _ = write!(out, "{index}</span>");
        }
        out.push_str("</div>");
    }

    let _ = write!(
        out,
        r#"<div class="code" style="margin-left: {}px;">"#,
        listing.options().code_offset(listing.len())
    );
    for line in listing.lines() {
        open_line(&mut out, listing, line.index());
        out.push_str(line.content());
        out.push_str("</span>");
    }
    out.push_str("</div></div></div>");
    out
}

fn open_line(out: &mut String, listing: &Listing, index: i64) {
    if listing.is_active(index) {
        let _ = write!(out, r#"<span {LINE_ATTR}="{index}" class="active">"#);
    } else {
        let _ = write!(out, r#"<span {LINE_ATTR}="{index}">"#);
    }
}

/// The document written into the raw-view popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawDocument {
    pub title: String,
    pub html: String,
    pub features: String,
}

pub fn raw_document(listing: &Listing) -> RawDocument {
    raw_document_for(&listing.raw_view_request())
}

pub fn raw_document_for(request: &PopupRequest) -> RawDocument {
    RawDocument {
        title: request.title.clone(),
        html: format!("<pre>{}</pre>", request.body),
        features: request.features(),
    }
}

/// Default stylesheet for listings rendered with `class_name`.
pub fn listing_css(class_name: &str) -> String {
    format!(
        r#"
.{class_name} .listing {{
    position: relative;
    font-family: monospace;
    white-space: pre;
}}
.{class_name} .buttons {{
    text-align: right;
}}
.{class_name} .buttons .raw {{
    cursor: pointer;
}}
.{class_name} .numbering {{
    position: absolute;
    left: 0;
    text-align: right;
    user-select: none;
}}
.{class_name} .numbering span,
.{class_name} .code span {{
    display: block;
}}
.{class_name} span.active {{
    background-color: rgba(255, 255, 0, 0.2);
}}
"#
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
