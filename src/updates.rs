//! Post changelog shown on `#latest`.
//!
//! `hashpage index` derives it from the git history of the posts directory
//! and writes it as `updates.json`, a map from commit time (Unix seconds)
//! to the posts that commit touched:
//!
//! ```json
//! {
//!   "1700000000": [{ "change": "new", "path": "guides/setup.md" }],
//!   "1700086400": [{ "change": "renamed", "path": "b.md", "from": "a.md" }]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::date::DateTimeUtc;
use crate::utils::html::{escape, escape_attr};

/// Extension of post files inside the changelog.
const POST_SUFFIX: &str = ".md";

/// What a commit did to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    New,
    Content,
    Renamed,
    Copied,
    Deleted,
}

impl ChangeKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Content => "content",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
            Self::Deleted => "deleted",
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::New => "is-success",
            Self::Content => "is-info",
            Self::Renamed | Self::Copied => "is-link",
            Self::Deleted => "is-danger",
        }
    }
}

/// One changed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub change: ChangeKind,
    /// Post file, relative to the posts directory.
    pub path: String,
    /// Source file of a rename or copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Change {
    pub fn new(change: ChangeKind, path: impl Into<String>) -> Self {
        Self {
            change,
            path: path.into(),
            from: None,
        }
    }

    pub fn moved(change: ChangeKind, path: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            change,
            path: path.into(),
            from: Some(from.into()),
        }
    }

    /// Route of the post, `None` for files that are not posts.
    pub fn route(&self) -> Option<&str> {
        self.path.strip_suffix(POST_SUFFIX)
    }

    fn to_html(&self) -> String {
        let label = escape(self.route().unwrap_or(&self.path));
        let target = match (self.change, self.route()) {
            (ChangeKind::Deleted, _) | (_, None) => label.into_owned(),
            (_, Some(route)) => format!("<a href=\"#{}\">{label}</a>", escape_attr(route)),
        };
        let origin = match &self.from {
            Some(from) => format!(
                " <span class=\"update-from\">from {}</span>",
                escape(from.strip_suffix(POST_SUFFIX).unwrap_or(from))
            ),
            None => String::new(),
        };

        format!(
            "<li><span class=\"tag {}\">{}</span> {target}{origin}</li>\n",
            self.change.color(),
            self.change.name()
        )
    }
}

/// Changes per commit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Updates {
    commits: BTreeMap<i64, Vec<Change>>,
}

impl Updates {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Add the changes of one commit. Commits sharing a timestamp are merged.
    pub fn record(&mut self, timestamp: i64, changes: impl IntoIterator<Item = Change>) {
        let mut changes = changes.into_iter().peekable();
        if changes.peek().is_none() {
            return;
        }
        self.commits.entry(timestamp).or_default().extend(changes);
    }

    /// Number of commits with changes.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.commits.keys().copied()
    }

    pub fn changes(&self, timestamp: i64) -> &[Change] {
        self.commits
            .get(&timestamp)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Commits from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = (i64, &[Change])> {
        self.commits
            .iter()
            .rev()
            .map(|(timestamp, changes)| (*timestamp, changes.as_slice()))
    }

    /// Markup of the `limit` most recent commits.
    pub fn to_html(&self, limit: usize) -> String {
        let mut html = String::from("<div class=\"updates\">\n");
        for (timestamp, changes) in self.newest_first().take(limit) {
            let date = DateTimeUtc::from_unix(timestamp);
            html.push_str(&format!(
                "<h2 class=\"update-date\"><time datetime=\"{}\">{}</time></h2>\n<ul class=\"update-list\">\n",
                date.to_rfc3339(),
                date.to_date()
            ));
            for change in changes {
                html.push_str(&change.to_html());
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");
        html
    }
}
