//! Navigation tree built from the post index.
//!
//! Every unique path prefix in the index becomes one node. Categories are
//! created on first use and keep their children in first-seen order:
//!
//! ```text
//! ["a/b", "a/c", "d"]  ->  a
//!                          ├── a/b
//!                          └── a/c
//!                          d
//! ```

use std::fmt::Write;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::request::PATH_DELIMITER;
use crate::utils::html::{escape, escape_attr};

/// One entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    /// Composite path, also the route the entry links to.
    pub id: String,
    /// Last path segment.
    pub label: String,
    /// Child node indices, in insertion order.
    #[serde(skip)]
    children: Vec<usize>,
}

impl MenuNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-backed navigation tree.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    nodes: Vec<MenuNode>,
    roots: Vec<usize>,
    by_id: FxHashMap<String, usize>,
}

impl Menu {
    /// Build a menu from an ordered list of `/`-delimited post paths.
    pub fn build<I, S>(index: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut menu = Self::default();
        for path in index {
            menu.insert(path.as_ref());
        }
        menu
    }

    /// Parse the JSON post index (an array of path strings).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let index: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::build(index))
    }

    /// Insert every prefix of `path`. Known prefixes are left untouched.
    pub fn insert(&mut self, path: &str) {
        let mut parent: Option<usize> = None;
        let mut id = String::new();

        for segment in path.split(PATH_DELIMITER).filter(|s| !s.is_empty()) {
            if !id.is_empty() {
                id.push(PATH_DELIMITER);
            }
            id.push_str(segment);

            let node = match self.by_id.get(&id) {
                Some(&node) => node,
                None => self.push_node(&id, segment, parent),
            };
            parent = Some(node);
        }
    }

    fn push_node(&mut self, id: &str, label: &str, parent: Option<usize>) -> usize {
        let node = self.nodes.len();
        self.nodes.push(MenuNode {
            id: id.to_owned(),
            label: label.to_owned(),
            children: Vec::new(),
        });
        self.by_id.insert(id.to_owned(), node);

        match parent {
            Some(parent) => self.nodes[parent].children.push(node),
            None => self.roots.push(node),
        }
        node
    }

    /// Look up a node by its composite path.
    pub fn get(&self, id: &str) -> Option<&MenuNode> {
        self.by_id.get(id).map(|&node| &self.nodes[node])
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &MenuNode> {
        self.roots.iter().map(|&node| &self.nodes[node])
    }

    /// Children of `node` in insertion order.
    pub fn children<'a>(&'a self, node: &'a MenuNode) -> impl Iterator<Item = &'a MenuNode> {
        node.children.iter().map(|&child| &self.nodes[child])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the menu entries to highlight for `path`: every existing
    /// ancestor prefix plus the entry itself.
    pub fn active_ids(&self, path: &[String]) -> Vec<String> {
        let mut prefix = String::new();
        let mut active = Vec::new();

        for (i, segment) in path.iter().enumerate() {
            if i > 0 {
                prefix.push(PATH_DELIMITER);
            }
            prefix.push_str(segment);
            if self.by_id.contains_key(&prefix) {
                active.push(prefix.clone());
            }
        }
        active
    }

    /// Nested list items for the `#menuList` element.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for &root in &self.roots {
            self.write_node(&mut html, root);
        }
        html
    }

    fn write_node(&self, html: &mut String, node: usize) {
        let MenuNode {
            id,
            label,
            children,
        } = &self.nodes[node];

        let _ = write!(
            html,
            "<li><a href=\"#{}\">{}</a>",
            escape_attr(id),
            escape(label)
        );
        if !children.is_empty() {
            html.push_str("<ul>");
            for &child in children {
                self.write_node(html, child);
            }
            html.push_str("</ul>");
        }
        html.push_str("</li>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(nodes: impl Iterator<Item = &'a MenuNode>) -> Vec<&'a str> {
        nodes.map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_build_nested_tree() {
        let menu = Menu::build(["a/b", "a/c", "d"]);

        assert_eq!(menu.len(), 4);
        assert_eq!(ids(menu.roots()), vec!["a", "d"]);

        let a = menu.get("a").unwrap();
        assert_eq!(ids(menu.children(a)), vec!["a/b", "a/c"]);
        assert_eq!(menu.get("a/c").unwrap().label, "c");
        assert!(!menu.get("d").unwrap().has_children());
    }

    #[test]
    fn test_duplicate_entries_are_not_reinserted() {
        let mut menu = Menu::build(["a/b", "a/c", "d"]);
        menu.insert("a/b");
        let rebuilt = Menu::build(["a/b", "a/c", "d", "a/b"]);

        for menu in [&menu, &rebuilt] {
            assert_eq!(menu.len(), 4);
            let a = menu.get("a").unwrap();
            assert_eq!(ids(menu.children(a)), vec!["a/b", "a/c"]);
        }
    }

    #[test]
    fn test_intermediate_nodes_created_lazily() {
        let menu = Menu::build(["x/y/z"]);
        assert_eq!(menu.len(), 3);
        assert_eq!(ids(menu.roots()), vec!["x"]);
        let y = menu.get("x/y").unwrap();
        assert_eq!(ids(menu.children(y)), vec!["x/y/z"]);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let menu = Menu::build(["", "a//b/", "/"]);
        assert_eq!(menu.len(), 2);
        assert!(menu.get("a/b").is_some());
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let menu = Menu::build(["b/2", "a", "b/1"]);
        assert_eq!(ids(menu.roots()), vec!["b", "a"]);
        let b = menu.get("b").unwrap();
        assert_eq!(ids(menu.children(b)), vec!["b/2", "b/1"]);
    }

    #[test]
    fn test_active_ids_cover_ancestors() {
        let menu = Menu::build(["guides/setup", "guides/advanced/tuning"]);
        let path: Vec<String> = ["guides", "advanced", "tuning"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            menu.active_ids(&path),
            vec!["guides", "guides/advanced", "guides/advanced/tuning"]
        );
    }

    #[test]
    fn test_active_ids_skip_unknown_entries() {
        let menu = Menu::build(["guides/setup"]);
        let path = vec!["guides".to_string(), "missing".to_string()];
        assert_eq!(menu.active_ids(&path), vec!["guides"]);
        assert!(menu.active_ids(&["latest".to_string()]).is_empty());
    }

    #[test]
    fn test_to_html() {
        let menu = Menu::build(["a/b", "d"]);
        assert_eq!(
            menu.to_html(),
            r##"<li><a href="#a">a</a><ul><li><a href="#a/b">b</a></li></ul></li><li><a href="#d">d</a></li>"##
        );
    }

    #[test]
    fn test_from_json() {
        let menu = Menu::from_json(r#"["guides/setup", "guides/advanced/tuning"]"#).unwrap();
        assert_eq!(menu.len(), 4);
        assert!(Menu::from_json("{}").is_err());
    }
}
