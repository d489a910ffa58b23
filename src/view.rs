//! Page regions the router writes into.
//!
//! The shell has three mutually exclusive content containers. After every
//! routing decision exactly one of them is visible.

use serde::Serialize;

use crate::utils::html::escape_attr;

/// Content container of the page shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Loading,
    Main,
    Message,
}

impl Container {
    pub const ALL: [Self; 3] = [Self::Loading, Self::Main, Self::Message];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Main => "main",
            Self::Message => "message",
        }
    }

    /// DOM id of the container element.
    pub fn element_id(self) -> String {
        format!("{}-container", self.name())
    }
}

/// Severity of a message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Warning,
    Danger,
}

impl MessageKind {
    /// Modifier class applied to the message box.
    pub const fn class(self) -> &'static str {
        match self {
            Self::Warning => "is-warning",
            Self::Danger => "is-danger",
        }
    }
}

/// Output side of the router.
pub trait View {
    /// Hide every container, then reveal `container`.
    fn show_container(&mut self, container: Container);

    /// Replace the main container's markup.
    fn set_main_content(&mut self, html: &str);

    /// Fill the message box.
    fn set_message(&mut self, kind: MessageKind, title: &str, body: &str);

    /// Scroll so the element with `id` sits at the top. No-op when absent.
    fn scroll_to_anchor(&mut self, id: &str);

    /// Highlight exactly the menu entries in `ids`.
    fn mark_active(&mut self, ids: &[String]);

    /// Rewrite the URL fragment (triggers a new navigation in a browser).
    fn set_fragment(&mut self, fragment: &str);
}

/// A message shown in the message box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

/// Headless view recording what a browser would display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryView {
    pub visible: Option<Container>,
    pub main: String,
    pub message: Option<Message>,
    pub active: Vec<String>,
    /// Anchors actually scrolled to, oldest first.
    pub scrolls: Vec<String>,
    /// Last fragment rewrite requested by the router.
    pub fragment: Option<String>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the main content contains an element with this id.
    pub fn has_element(&self, id: &str) -> bool {
        let needle = format!("id=\"{}\"", escape_attr(id));
        self.main.contains(&needle)
    }
}

impl View for MemoryView {
    fn show_container(&mut self, container: Container) {
        self.visible = Some(container);
    }

    fn set_main_content(&mut self, html: &str) {
        self.main = html.to_owned();
    }

    fn set_message(&mut self, kind: MessageKind, title: &str, body: &str) {
        self.message = Some(Message {
            kind,
            title: title.to_owned(),
            body: body.to_owned(),
        });
    }

    fn scroll_to_anchor(&mut self, id: &str) {
        if self.has_element(id) {
            self.scrolls.push(id.to_owned());
        }
    }

    fn mark_active(&mut self, ids: &[String]) {
        self.active = ids.to_vec();
    }

    fn set_fragment(&mut self, fragment: &str) {
        self.fragment = Some(fragment.to_owned());
    }
}
