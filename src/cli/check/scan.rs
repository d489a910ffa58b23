//! Post scanning for link checks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pulldown_cmark::{Event, Parser, Tag};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cli::common::post_route;
use hashpage::markdown;
use hashpage::utils::link::LinkKind;

/// A link extracted from a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLink {
    pub dest: String,
    /// Whether the link is an image source.
    pub image: bool,
}

impl ScannedLink {
    #[inline]
    pub fn kind(&self) -> LinkKind<'_> {
        LinkKind::parse(&self.dest)
    }
}

/// Every link destination of a post, in document order.
pub fn extract_links(markdown: &str) -> Vec<ScannedLink> {
    Parser::new_ext(markdown, markdown::parser_options())
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. }) => Some(ScannedLink {
                dest: dest_url.into_string(),
                image: false,
            }),
            Event::Start(Tag::Image { dest_url, .. }) => Some(ScannedLink {
                dest: dest_url.into_string(),
                image: true,
            }),
            _ => None,
        })
        .filter(|link| !link.dest.is_empty())
        .collect()
}

/// Read a post and extract its links.
pub fn scan_post(file: &Path) -> Result<Vec<ScannedLink>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    Ok(extract_links(&content))
}

/// Routes and heading texts of every post on the site.
#[derive(Debug, Default)]
pub struct PostIndex {
    headings: FxHashMap<String, FxHashSet<String>>,
}

impl PostIndex {
    /// Index `posts` in parallel. Unreadable posts are kept with no headings.
    pub fn build(posts_dir: &Path, posts: &[PathBuf]) -> Self {
        let headings = posts
            .par_iter()
            .filter_map(|post| {
                let route = post_route(posts_dir, post)?;
                let headings = fs::read_to_string(post)
                    .map(|content| markdown::headings(&content).into_iter().collect())
                    .unwrap_or_default();
                Some((route, headings))
            })
            .collect();
        Self { headings }
    }

    pub fn contains(&self, route: &str) -> bool {
        self.headings.contains_key(route)
    }

    pub fn has_section(&self, route: &str, section: &str) -> bool {
        self.headings
            .get(route)
            .is_some_and(|headings| headings.contains(section))
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }
}
