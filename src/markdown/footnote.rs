//! Footnote numbering and namespaced anchor markup.
//!
//! Footnotes are numbered from 1 in order of first reference. Reusing a label
//! produces sub-ids `:1`, `:2`, ... on the reference anchors so that every
//! reference gets its own back-link.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::request::FOOTNOTE_DELIMITER;
use crate::utils::html::escape_attr;

/// One emitted reference to a footnote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootnoteRef {
    /// Display number of the footnote.
    pub number: usize,
    /// Index of this reference among all references to the same label.
    pub sub: usize,
}

/// Numbering state for one rendered document.
#[derive(Debug, Default)]
pub struct Footnotes {
    defined: FxHashSet<String>,
    numbers: FxHashMap<String, usize>,
    seen: FxHashMap<String, usize>,
    order: Vec<String>,
}

impl Footnotes {
    pub fn new(defined: impl IntoIterator<Item = String>) -> Self {
        Self {
            defined: defined.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Register a reference. `None` when the label has no definition.
    pub fn reference(&mut self, label: &str) -> Option<FootnoteRef> {
        if !self.defined.contains(label) {
            return None;
        }

        let next = self.order.len() + 1;
        let number = *self.numbers.entry(label.to_owned()).or_insert_with(|| {
            self.order.push(label.to_owned());
            next
        });

        let seen = self.seen.entry(label.to_owned()).or_insert(0);
        let sub = *seen;
        *seen += 1;

        Some(FootnoteRef { number, sub })
    }

    /// Label of the n-th numbered footnote (0-based), if any.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.order.get(index).map(String::as_str)
    }

    /// How many references to `label` were emitted.
    pub fn reference_count(&self, label: &str) -> usize {
        self.seen.get(label).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// `<path>^<n>`: id of the footnote list item.
pub fn item_id(doc_path: &str, number: usize) -> String {
    format!("{doc_path}{FOOTNOTE_DELIMITER}{number}")
}

/// `<path>^ref<n>[:<sub>]`: id of one reference anchor.
pub fn ref_id(doc_path: &str, number: usize, sub: usize) -> String {
    if sub == 0 {
        format!("{doc_path}{FOOTNOTE_DELIMITER}ref{number}")
    } else {
        format!("{doc_path}{FOOTNOTE_DELIMITER}ref{number}:{sub}")
    }
}

/// Superscript link from the text to the footnote item.
pub fn reference_html(doc_path: &str, footnote: FootnoteRef) -> String {
    let FootnoteRef { number, sub } = footnote;
    format!(
        r##"<sup class="footnote-ref"><a href="#{}" id="{}">[{number}]</a></sup>"##,
        escape_attr(&item_id(doc_path, number)),
        escape_attr(&ref_id(doc_path, number, sub)),
    )
}

/// Back-reference arrows, one per reference to footnote `number`.
pub fn backrefs_html(doc_path: &str, number: usize, references: usize) -> String {
    (0..references)
        .map(|sub| {
            format!(
                r##" <a href="#{}" class="footnote-backref">↩︎</a>"##,
                escape_attr(&ref_id(doc_path, number, sub))
            )
        })
        .collect()
}

/// Opening markup of one footnote list item.
pub fn item_open_html(doc_path: &str, number: usize) -> String {
    format!(
        "<li id=\"{}\" class=\"footnote-item\">",
        escape_attr(&item_id(doc_path, number))
    )
}

pub const SECTION_OPEN: &str =
    "<hr class=\"footnotes-sep\">\n<section class=\"footnotes\">\n<ol class=\"footnotes-list\">\n";
pub const SECTION_CLOSE: &str = "</ol>\n</section>\n";

#[cfg(test)]
mod tests {
    use super::*;

    fn footnotes(labels: &[&str]) -> Footnotes {
        Footnotes::new(labels.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_numbering_follows_first_reference() {
        let mut notes = footnotes(&["a", "b"]);
        assert_eq!(notes.reference("b").unwrap().number, 1);
        assert_eq!(notes.reference("a").unwrap().number, 2);
        assert_eq!(notes.label_at(0), Some("b"));
        assert_eq!(notes.label_at(1), Some("a"));
    }

    #[test]
    fn test_reused_label_gets_sub_ids() {
        let mut notes = footnotes(&["x"]);
        assert_eq!(notes.reference("x"), Some(FootnoteRef { number: 1, sub: 0 }));
        assert_eq!(notes.reference("x"), Some(FootnoteRef { number: 1, sub: 1 }));
        assert_eq!(notes.reference_count("x"), 2);
    }

    #[test]
    fn test_undefined_label() {
        let mut notes = footnotes(&[]);
        assert_eq!(notes.reference("missing"), None);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_ids_are_namespaced() {
        assert_eq!(item_id("guides/setup", 1), "guides/setup^1");
        assert_eq!(ref_id("guides/setup", 1, 0), "guides/setup^ref1");
        assert_eq!(ref_id("guides/setup", 1, 2), "guides/setup^ref1:2");
    }

    #[test]
    fn test_reference_html() {
        let html = reference_html("a", FootnoteRef { number: 3, sub: 1 });
        assert_eq!(
            html,
            r##"<sup class="footnote-ref"><a href="#a^3" id="a^ref3:1">[3]</a></sup>"##
        );
    }

    #[test]
    fn test_backrefs_html() {
        let html = backrefs_html("a", 1, 2);
        assert!(html.contains(r##"href="#a^ref1""##));
        assert!(html.contains(r##"href="#a^ref1:1""##));
    }
}
