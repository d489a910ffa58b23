//! Inline post attributes.
//!
//! Posts carry bracketed `name:value` markers in their text:
//!
//! | Marker                 | Rendered as                                       |
//! |------------------------|---------------------------------------------------|
//! | `[status:in-progress]` | `<span class="tag is-warning">in-progress</span>` |
//! | `[status:done]`        | `<span class="tag is-success">done</span>`        |
//! | `[status:draft]`       | `<span class="tag">draft</span>`                  |
//! | `[tag:rust]`           | `<span class="tag">rust</span>`                   |
//! | `[created:2021-04-01]` | removed                                           |
//!
//! Brackets with any other content are left alone.

use pulldown_cmark::Event;

use crate::utils::html::escape;

/// Tag values with a color modifier.
pub const TAG_COLORS: &[(&str, &str)] = &[("in-progress", "warning"), ("done", "success")];

/// Bulma-style color for a tag value, if it has one.
pub fn color(value: &str) -> Option<&'static str> {
    TAG_COLORS
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, color)| *color)
}

/// A recognized marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute<'t> {
    /// Shown as a tag.
    Label(&'t str),
    /// Metadata only.
    Hidden,
}

fn parse(inner: &str) -> Option<Attribute<'_>> {
    let (name, value) = inner.split_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match name.trim() {
        "status" | "tag" => Some(Attribute::Label(value)),
        "created" => Some(Attribute::Hidden),
        _ => None,
    }
}

/// Markup of one tag.
pub fn tag_html(value: &str) -> String {
    match color(value) {
        Some(color) => format!("<span class=\"tag is-{color}\">{}</span>", escape(value)),
        None => format!("<span class=\"tag\">{}</span>", escape(value)),
    }
}

/// Split a run of text into plain text and tag markup.
pub(super) fn expand<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let marker = after
            .find(']')
            .and_then(|close| parse(&after[..close]).map(|attr| (close, attr)));

        let Some((close, attribute)) = marker else {
            plain.push_str(&rest[..=open]);
            rest = after;
            continue;
        };

        plain.push_str(&rest[..open]);
        if !plain.is_empty() {
            out.push(Event::Text(std::mem::take(&mut plain).into()));
        }
        if let Attribute::Label(value) = attribute {
            out.push(Event::InlineHtml(tag_html(value).into()));
        }
        rest = &after[close + 1..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Event::Text(plain.into()));
    }
}
