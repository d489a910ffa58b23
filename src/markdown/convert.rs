//! Event rewriting on top of `pulldown-cmark`.
//!
//! The parser's event stream is split into the document body and the
//! footnote definitions. The body is rewritten (namespaced footnote
//! references, wrapped headings, attribute tags), then the referenced
//! definitions are appended as a numbered list and everything goes through
//! the stock HTML writer.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use rustc_hash::FxHashMap;

use super::footnote::{self, Footnotes};
use super::tags;
use crate::request::SECTION_DELIMITER;
use crate::utils::html::escape_attr;

type Definitions<'a> = FxHashMap<String, Vec<Event<'a>>>;

/// Heading being collected until its end tag.
struct HeadingBuffer<'a> {
    level: HeadingLevel,
    text: String,
    events: Vec<Event<'a>>,
}

impl<'a> HeadingBuffer<'a> {
    fn new(level: HeadingLevel) -> Self {
        Self {
            level,
            text: String::new(),
            events: Vec::new(),
        }
    }

    /// Wrap the heading in a container carrying the `<path>:<text>` anchor.
    fn finish(self, doc_path: &str, out: &mut Vec<Event<'a>>) {
        let id = format!("{doc_path}{SECTION_DELIMITER}{}", self.text);
        let id = escape_attr(&id);
        let level = self.level as u8;

        out.push(Event::Html(
            format!("<div class=\"heading-anchor\" id=\"{id}\">\n<h{level}>").into(),
        ));
        out.extend(self.events);
        out.push(Event::Html(
            format!(
                " <a class=\"heading-link\" href=\"#{id}\">¶</a></h{level}>\n</div>\n"
            )
            .into(),
        ));
    }
}

/// Markdown to HTML converter for one document.
pub(super) struct HtmlConverter<'p> {
    doc_path: &'p str,
    footnotes: Footnotes,
}

impl<'p> HtmlConverter<'p> {
    pub fn new(doc_path: &'p str) -> Self {
        Self {
            doc_path,
            footnotes: Footnotes::default(),
        }
    }

    /// Convert a parsed document to HTML.
    pub fn convert(mut self, parser: Parser<'_>) -> String {
        let (body, mut definitions) = split_definitions(parser);
        self.footnotes = Footnotes::new(definitions.keys().cloned());

        let mut events = Vec::with_capacity(body.len());
        self.rewrite(body, &mut events);
        self.append_footnotes(&mut definitions, &mut events);

        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        html
    }

    /// Rewrite a run of events into `out`.
    ///
    /// Adjacent text outside headings and code blocks is joined so that
    /// attribute markers split by the parser are still recognized.
    fn rewrite<'a>(&mut self, events: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        let mut heading: Option<HeadingBuffer<'a>> = None;
        let mut in_code_block = false;
        let mut text = String::new();

        for event in events {
            if heading.is_none() && !in_code_block {
                if let Event::Text(run) = &event {
                    text.push_str(run);
                    continue;
                }
            }
            if !text.is_empty() {
                tags::expand(&std::mem::take(&mut text), out);
            }

            match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    out.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    out.push(event);
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    heading = Some(HeadingBuffer::new(level));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(buffer) = heading.take() {
                        buffer.finish(self.doc_path, out);
                    }
                }
                event => {
                    let target = match heading.as_mut() {
                        Some(buffer) => {
                            if let Event::Text(text) | Event::Code(text) = &event {
                                buffer.text.push_str(text);
                            }
                            &mut buffer.events
                        }
                        None => &mut *out,
                    };
                    target.push(self.map_event(event));
                }
            }
        }

        if !text.is_empty() {
            tags::expand(&text, out);
        }
    }

    fn map_event<'a>(&mut self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::FootnoteReference(label) => match self.footnotes.reference(&label) {
                Some(reference) => {
                    Event::InlineHtml(footnote::reference_html(self.doc_path, reference).into())
                }
                None => Event::Text(format!("[^{label}]").into()),
            },
            event => event,
        }
    }

    /// Render referenced definitions as a numbered list.
    ///
    /// Definitions may reference further footnotes, which extends the
    /// numbering while the list is being written.
    fn append_footnotes<'a>(&mut self, definitions: &mut Definitions<'a>, out: &mut Vec<Event<'a>>) {
        if self.footnotes.is_empty() {
            return;
        }

        out.push(Event::Html(footnote::SECTION_OPEN.into()));

        let mut index = 0;
        while let Some(label) = self.footnotes.label_at(index).map(str::to_owned) {
            index += 1;
            let number = index;
            let body = definitions.remove(&label).unwrap_or_default();

            let mut item = Vec::with_capacity(body.len() + 2);
            self.rewrite(body, &mut item);

            let backrefs = footnote::backrefs_html(
                self.doc_path,
                number,
                self.footnotes.reference_count(&label),
            );
            let backrefs = Event::InlineHtml(backrefs.into());
            match item
                .iter()
                .rposition(|e| matches!(e, Event::End(TagEnd::Paragraph)))
            {
                Some(pos) => item.insert(pos, backrefs),
                None => item.push(backrefs),
            }

            out.push(Event::Html(
                footnote::item_open_html(self.doc_path, number).into(),
            ));
            out.extend(item);
            out.push(Event::Html("</li>\n".into()));
        }

        out.push(Event::Html(footnote::SECTION_CLOSE.into()));
    }
}

/// Separate footnote definitions from the document body.
fn split_definitions(parser: Parser<'_>) -> (Vec<Event<'_>>, Definitions<'_>) {
    let mut body = Vec::new();
    let mut definitions = Definitions::default();
    let mut current: Option<(String, Vec<Event<'_>>)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::FootnoteDefinition(label)) => {
                current = Some((label.to_string(), Vec::new()));
            }
            Event::End(TagEnd::FootnoteDefinition) => {
                if let Some((label, events)) = current.take() {
                    // first definition wins
                    definitions.entry(label).or_insert(events);
                }
            }
            event => match current.as_mut() {
                Some((_, events)) => events.push(event),
                None => body.push(event),
            },
        }
    }

    (body, definitions)
}
