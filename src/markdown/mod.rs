//! Markdown rendering with document-namespaced anchors.
//!
//! All posts share one page, so heading and footnote ids carry the path of
//! the document they belong to:
//!
//! | Element          | Id                        |
//! |------------------|---------------------------|
//! | heading          | `<path>:<heading text>`   |
//! | footnote item    | `<path>^<n>`              |
//! | footnote ref     | `<path>^ref<n>[:<k>]`     |
//!
//! Heading ids use the literal heading text, spaces and punctuation included.
//! Attribute markers such as `[status:done]` become tags, see [`tags`].

mod convert;
pub mod footnote;
pub mod tags;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use convert::HtmlConverter;

/// Extensions enabled for every post.
pub fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Render a post to HTML, namespacing anchors by `doc_path`.
pub fn render(markdown: &str, doc_path: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    HtmlConverter::new(doc_path).convert(parser)
}

/// Literal text of every heading, in document order.
///
/// These are the section ids a `#<path>:<section>` link can target.
pub fn headings(markdown: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut current: Option<String> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { .. }) => current = Some(String::new()),
            Event::End(TagEnd::Heading(_)) => headings.extend(current.take()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            _ => {}
        }
    }

    headings
}
