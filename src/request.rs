//! URL fragment parsing into a document request.
//!
//! A fragment addresses one post plus at most one anchor inside it:
//!
//! ```text
//! #guides/setup               -> path ["guides", "setup"]
//! #guides/setup:Installation  -> path + section "Installation"
//! #guides/setup^1             -> path + footnote "1"
//! ```
//!
//! The footnote split happens before the section split: a `^` marker is found
//! even after a section, and any `:` ahead of it starts a section.

use std::fmt;

use serde::Serialize;

/// Separates path segments.
pub const PATH_DELIMITER: char = '/';
/// Separates the document path from a heading id.
pub const SECTION_DELIMITER: char = ':';
/// Separates the document path from a footnote id.
pub const FOOTNOTE_DELIMITER: char = '^';

/// A parsed navigation target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Request {
    /// Hierarchical document identifier. Never empty after parsing.
    pub path: Vec<String>,
    /// Heading id inside the document.
    pub section: Option<String>,
    /// Footnote id inside the document.
    pub footnote: Option<String>,
}

impl Request {
    /// Parse a fragment, with or without its leading `#`.
    ///
    /// Malformed input degrades to empty fields, it never fails.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        let mut parts = fragment.split(FOOTNOTE_DELIMITER);
        let head = parts.next().unwrap_or_default();
        let footnote = non_empty(parts.next());

        let mut parts = head.split(SECTION_DELIMITER);
        let head = parts.next().unwrap_or_default();
        let section = non_empty(parts.next());

        let path = head.split(PATH_DELIMITER).map(str::to_owned).collect();

        Self {
            path,
            section,
            footnote,
        }
    }

    /// First path segment, empty for a bare `#`.
    pub fn first_segment(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    /// Path segments joined with `/`.
    pub fn build_path(&self) -> String {
        self.path.join(&PATH_DELIMITER.to_string())
    }

    /// `<path>:<section>`, the element id of the requested heading.
    pub fn build_section(&self) -> Option<String> {
        self.section
            .as_ref()
            .map(|section| format!("{}{SECTION_DELIMITER}{section}", self.build_path()))
    }

    /// `<path>^<footnote>`, the element id of the requested footnote.
    pub fn build_footnote(&self) -> Option<String> {
        self.footnote
            .as_ref()
            .map(|footnote| format!("{}{FOOTNOTE_DELIMITER}{footnote}", self.build_path()))
    }

    /// Element id to scroll to. A section takes precedence over a footnote.
    pub fn anchor(&self) -> Option<String> {
        self.build_section().or_else(|| self.build_footnote())
    }

    /// Whether both requests address the same document.
    pub fn same_document(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor() {
            Some(anchor) => f.write_str(&anchor),
            None => f.write_str(&self.build_path()),
        }
    }
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section() {
        let request = Request::parse("#a/b:Sec");
        assert_eq!(request.path, vec!["a", "b"]);
        assert_eq!(request.section.as_deref(), Some("Sec"));
        assert_eq!(request.footnote, None);
    }

    #[test]
    fn test_parse_footnote() {
        let request = Request::parse("#a/b^3");
        assert_eq!(request.path, vec!["a", "b"]);
        assert_eq!(request.footnote.as_deref(), Some("3"));
        assert_eq!(request.section, None);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Request::parse("#").path, vec![""]);
        assert_eq!(Request::parse("").path, vec![""]);
        assert_eq!(Request::parse("#").first_segment(), "");
    }

    #[test]
    fn test_parse_without_marker() {
        let request = Request::parse("guides/setup");
        assert_eq!(request.path, vec!["guides", "setup"]);
    }

    #[test]
    fn test_only_leading_marker_is_stripped() {
        let request = Request::parse("##a");
        assert_eq!(request.path, vec!["#a"]);
    }

    #[test]
    fn test_empty_anchors_are_absent() {
        let request = Request::parse("#a:");
        assert_eq!(request.section, None);
        let request = Request::parse("#a^");
        assert_eq!(request.footnote, None);
    }

    #[test]
    fn test_footnote_after_section_marker() {
        // footnote is split off first, the section survives in the head
        let request = Request::parse("#a:Sec^2");
        assert_eq!(request.path, vec!["a"]);
        assert_eq!(request.section.as_deref(), Some("Sec"));
        assert_eq!(request.footnote.as_deref(), Some("2"));
        assert_eq!(request.anchor().as_deref(), Some("a:Sec"));
    }

    #[test]
    fn test_colon_inside_footnote_id() {
        let request = Request::parse("#a^x:y");
        assert_eq!(request.footnote.as_deref(), Some("x:y"));

        let request = Request::parse("#a:x^y:z");
        assert_eq!(request.section.as_deref(), Some("x"));
    }

    #[test]
    fn test_extra_delimiters_take_second_part() {
        let request = Request::parse("#a^1^2");
        assert_eq!(request.footnote.as_deref(), Some("1"));
        let request = Request::parse("#a:one:two");
        assert_eq!(request.section.as_deref(), Some("one"));
    }

    #[test]
    fn test_build_fragments() {
        let request = Request::parse("#guides/setup:Installation");
        assert_eq!(request.build_path(), "guides/setup");
        assert_eq!(
            request.build_section().as_deref(),
            Some("guides/setup:Installation")
        );
        assert_eq!(request.build_footnote(), None);

        let request = Request::parse("#guides/setup^1");
        assert_eq!(request.build_footnote().as_deref(), Some("guides/setup^1"));
        assert_eq!(request.to_string(), "guides/setup^1");
    }

    #[test]
    fn test_path_round_trip() {
        let fragments = [
            "#",
            "#latest",
            "#a/b/c",
            "#a//b",
            "#a/b:Sec",
            "#a/b^3",
            "a/b:Sec with spaces^4",
            "#trailing/",
        ];
        for fragment in fragments {
            let parsed = Request::parse(fragment);
            let reparsed = Request::parse(&parsed.build_path());
            assert_eq!(parsed.path, reparsed.path, "fragment {fragment:?}");
        }
    }

    #[test]
    fn test_same_document_ignores_anchors() {
        let a = Request::parse("#guides/setup");
        let b = Request::parse("#guides/setup:Installation");
        let c = Request::parse("#guides/other");
        assert!(a.same_document(&b));
        assert!(!a.same_document(&c));
    }
}
