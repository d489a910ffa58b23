//! `View` backed by the live document.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use crate::view::{Container, MessageKind, View};

const CONTAINER_CLASS: &str = "content-container";
const HIDDEN_CLASS: &str = "is-hidden";
const ACTIVE_CLASS: &str = "is-active";
const MENU_LINKS: &str = "#menuList li a";
const MESSAGE_TITLE: &str = "#message-container .message-header > p";
const MESSAGE_BODY: &str = "#message-container .message-body";

pub struct DomView {
    window: Window,
    document: Document,
}

impl DomView {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    fn container(&self, container: Container) -> Option<Element> {
        self.document.get_element_by_id(&container.element_id())
    }

    fn select(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }
}

impl View for DomView {
    fn show_container(&mut self, container: Container) {
        // every container in the shell, not only the known ones
        let all = self.document.get_elements_by_class_name(CONTAINER_CLASS);
        for i in 0..all.length() {
            if let Some(element) = all.item(i) {
                let _ = element.class_list().add_1(HIDDEN_CLASS);
            }
        }
        if let Some(element) = self.container(container) {
            let _ = element.class_list().remove_1(HIDDEN_CLASS);
        }
    }

    fn set_main_content(&mut self, html: &str) {
        if let Some(main) = self.container(Container::Main) {
            main.set_inner_html(html);
        }
    }

    fn set_message(&mut self, kind: MessageKind, title: &str, body: &str) {
        if let Some(message) = self.container(Container::Message) {
            let classes = message.class_list();
            for other in [MessageKind::Warning, MessageKind::Danger] {
                let _ = classes.toggle_with_force(other.class(), other == kind);
            }
        }
        if let Some(header) = self.select(MESSAGE_TITLE) {
            header.set_text_content(Some(title));
        }
        if let Some(content) = self.select(MESSAGE_BODY) {
            content.set_text_content(Some(body));
        }
    }

    fn scroll_to_anchor(&mut self, id: &str) {
        let Some(target) = self
            .document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        if let Some(scroller) = self.document.scrolling_element() {
            scroller.set_scroll_top(target.offset_top());
        }
    }

    fn mark_active(&mut self, ids: &[String]) {
        let Ok(links) = self.document.query_selector_all(MENU_LINKS) else {
            return;
        };
        for i in 0..links.length() {
            let Some(link) = links.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let target = link.get_attribute("href").unwrap_or_default();
            let target = target.strip_prefix('#').unwrap_or(&target);
            let active = ids.iter().any(|id| id == target);
            let _ = link.class_list().toggle_with_force(ACTIVE_CLASS, active);
        }
    }

    fn set_fragment(&mut self, fragment: &str) {
        let _ = self.window.location().set_hash(fragment);
    }
}
