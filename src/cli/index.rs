//! `hashpage index`: generate the post index.
//!
//! The index is a JSON array of routes: every post plus every directory
//! that (transitively) contains one, sorted.
//!
//! ```text
//! posts/about.md            ["about",
//! posts/guides/setup.md  ->  "guides",
//!                            "guides/setup"]
//! ```
//!
//! When the posts live in a git repository the changelog is written next
//! to it, see [`super::changelog`].

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::IndexArgs;
use super::changelog::{collect_history, write_history};
use super::common::{collect_posts, post_route};
use crate::config::SiteConfig;
use hashpage::request::PATH_DELIMITER;
use hashpage::utils::plural::plural_count;
use hashpage::{debug, log};

/// Routes of every post and category under `posts_dir`.
pub fn build_index(posts_dir: &Path) -> Result<Vec<String>> {
    if !posts_dir.is_dir() {
        bail!("Posts directory not found: {}", posts_dir.display());
    }

    let mut entries = BTreeSet::new();
    for post in collect_posts(posts_dir) {
        let Some(route) = post_route(posts_dir, &post) else {
            debug!("index"; "skipping {}", post.display());
            continue;
        };

        for (i, _) in route.match_indices(PATH_DELIMITER) {
            entries.insert(route[..i].to_owned());
        }
        entries.insert(route);
    }

    Ok(entries.into_iter().collect())
}

/// Serialize the index the way the client expects it.
pub fn render_index(entries: &[String]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    Ok(json)
}

/// Build the index and write it to `build.index` (or stdout).
pub fn write_index(config: &SiteConfig, args: &IndexArgs) -> Result<()> {
    let entries = build_index(&config.posts_dir())?;
    let json = render_index(&entries)?;

    if args.stdout {
        print!("{json}");
        return Ok(());
    }

    let path = config.index_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(&path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;

    log!(
        "index";
        "wrote {} to {}",
        plural_count(entries.len(), "route"),
        config.root_relative(&path).display()
    );

    if !args.no_updates {
        match collect_history(&config.posts_dir())? {
            Some(history) => write_history(config, &history)?,
            None => debug!("updates"; "posts are not in a git repository, skipping changelog"),
        }
    }
    Ok(())
}
