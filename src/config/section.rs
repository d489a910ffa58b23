//! Configuration sections of `site.toml`.
//!
//! ```toml
//! [site]
//! title = "Notes"
//! latest = "<h1>Recently updated</h1>"   # markup for #latest
//!
//! [build]
//! posts = "posts"                        # Markdown posts, relative to the root
//! index = "post_index.json"              # generated post index
//! updates = "updates.json"               # changelog from the posts' git history
//! diffs = "update_diffs"                 # one diff file per commit
//!
//! [check]
//! sections = true                        # verify #post:section targets
//! files = true                           # verify links to site files
//! warn_only = false                      # report without failing
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigDiagnostics;
use super::util::is_contained;

// ============================================================================
// [site]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Page title written into the shell.
    pub title: String,

    /// Markup shown for `#latest`. Client default when unset.
    pub latest: Option<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Notes".to_owned(),
            latest: None,
        }
    }
}

// ============================================================================
// [build]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Posts directory. Also the URL prefix the client fetches posts from.
    pub posts: String,

    /// Post index file. Also the URL the client fetches the index from.
    pub index: String,

    /// Changelog file, written when the posts live in a git repository.
    pub updates: String,

    /// Directory receiving `<timestamp>.json` diffs, next to the changelog.
    pub diffs: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            posts: "posts".to_owned(),
            index: "post_index.json".to_owned(),
            updates: "updates.json".to_owned(),
            diffs: "update_diffs".to_owned(),
        }
    }
}

impl BuildSection {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        Self::validate_path(diag, "build.posts", &self.posts, "posts");
        Self::validate_path(diag, "build.index", &self.index, "post_index.json");
        Self::validate_path(diag, "build.updates", &self.updates, "updates.json");
        Self::validate_path(diag, "build.diffs", &self.diffs, "update_diffs");
    }

    fn validate_path(
        diag: &mut ConfigDiagnostics,
        field: &'static str,
        value: &str,
        example: &str,
    ) {
        if value.trim().is_empty() {
            diag.error(field, "must not be empty");
        } else if !is_contained(value) {
            diag.error_with_hint(
                field,
                format!("`{value}` must be a path inside the site root"),
                format!("use a relative path such as `{example}`"),
            );
        }
    }
}

// ============================================================================
// [check]
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSection {
    /// Verify that `#post:section` links name an existing heading.
    pub sections: bool,

    /// Verify that links to site files point at existing files.
    pub files: bool,

    /// Report problems without failing the command.
    pub warn_only: bool,
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            sections: true,
            files: true,
            warn_only: false,
        }
    }
}
