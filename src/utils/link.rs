//! Link classification utilities.
//!
//! Every page is rendered inside the root shell, so a relative link in a
//! post resolves against the site root, never against the post's directory.

/// Syntactic classification of links found in posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with URL scheme (https://, mailto:, tel:, etc.)
    External(&'a str),
    /// In-app route (#guides/setup:Section). Value is the fragment without `#`.
    Route(&'a str),
    /// Site file (/images/a.png, files/b.pdf). Value has no leading slash,
    /// query or fragment.
    File(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if let Some(route) = link.strip_prefix('#') {
            Self::Route(route)
        } else {
            let path = link.split(['?', '#']).next().unwrap_or_default();
            let path = path.strip_prefix("./").unwrap_or(path);
            Self::File(path.trim_start_matches('/'))
        }
    }
}

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
