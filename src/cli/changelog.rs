//! Post changelog from the git history of the posts directory.
//!
//! Every commit reachable from `HEAD` is compared with its first parent
//! (the empty tree for a root commit). Only `.md` files below the posts
//! directory count:
//!
//! | Change    | Meaning                                                  |
//! |-----------|----------------------------------------------------------|
//! | `new`     | path appears with content not seen in the parent         |
//! | `content` | path kept, blob changed                                  |
//! | `renamed` | path appears with the blob of a path that disappeared    |
//! | `copied`  | path appears with the blob of a path that still exists   |
//! | `deleted` | path disappears                                          |
//!
//! Commits without post changes are skipped. Each remaining commit also
//! gets `<diffs>/<timestamp>.json`, a list of `{ path, diff }` unified diffs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use gix::bstr::ByteSlice;
use gix::{ObjectId, Repository};
use serde::Serialize;
use similar::TextDiff;

use super::common::POST_EXTENSION;
use crate::config::SiteConfig;
use hashpage::updates::{Change, ChangeKind, Updates};
use hashpage::utils::plural::plural_count;
use hashpage::{debug, log};

/// Post blobs of one tree, keyed by path relative to the posts directory.
type Snapshot = BTreeMap<String, ObjectId>;

/// Unified diff of one changed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub diff: String,
}

/// Changelog plus the diffs of each recorded commit.
#[derive(Debug, Default)]
pub struct History {
    pub updates: Updates,
    pub diffs: BTreeMap<i64, Vec<FileDiff>>,
}

impl History {
    fn record(&mut self, timestamp: i64, changes: Vec<Change>, diffs: Vec<FileDiff>) {
        self.updates.record(timestamp, changes);
        self.diffs.entry(timestamp).or_default().extend(diffs);
    }
}

/// Walk the history of the repository holding `posts_dir`.
///
/// `None` when the posts are not under version control.
pub fn collect_history(posts_dir: &Path) -> Result<Option<History>> {
    let Ok(repo) = gix::discover(posts_dir) else {
        return Ok(None);
    };
    let prefix = posts_prefix(&repo, posts_dir)?;

    let Ok(head) = repo.head_commit() else {
        debug!("updates"; "repository has no commits yet");
        return Ok(Some(History::default()));
    };

    let mut history = History::default();
    for info in head.ancestors().all()? {
        let info = info?;
        let commit = repo.find_object(info.id)?.try_into_commit()?;

        let new = snapshot(&commit.tree()?, &prefix)?;
        let old = match commit.parent_ids().next() {
            Some(parent) => snapshot(&parent.object()?.try_into_commit()?.tree()?, &prefix)?,
            None => Snapshot::new(),
        };

        let changes = classify(&old, &new);
        if changes.is_empty() {
            continue;
        }

        let diffs = changes
            .iter()
            .map(|change| file_diff(&repo, &old, &new, change))
            .collect::<Result<Vec<_>>>()?;
        history.record(commit.time()?.seconds, changes, diffs);
    }

    Ok(Some(history))
}

/// Posts directory relative to the work tree, as a `/`-terminated prefix.
fn posts_prefix(repo: &Repository, posts_dir: &Path) -> Result<String> {
    if repo.is_bare() {
        bail!("Bare repositories are not supported");
    }
    let workdir = repo
        .path()
        .parent()
        .ok_or_else(|| anyhow!("Invalid repository path"))?;
    let workdir = fs::canonicalize(workdir)
        .with_context(|| format!("Failed to resolve '{}'", workdir.display()))?;
    let posts = fs::canonicalize(posts_dir)
        .with_context(|| format!("Failed to resolve '{}'", posts_dir.display()))?;

    let relative = posts.strip_prefix(&workdir).with_context(|| {
        format!(
            "Posts directory '{}' is outside the repository '{}'",
            posts.display(),
            workdir.display()
        )
    })?;

    let mut prefix = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if !prefix.is_empty() {
        prefix.push('/');
    }
    Ok(prefix)
}

fn snapshot(tree: &gix::Tree<'_>, prefix: &str) -> Result<Snapshot> {
    let mut recorder = gix::traverse::tree::Recorder::default();
    tree.traverse().breadthfirst(&mut recorder)?;

    let suffix = format!(".{POST_EXTENSION}");
    Ok(recorder
        .records
        .into_iter()
        .filter(|entry| entry.mode.is_blob())
        .filter_map(|entry| {
            let path = entry.filepath.to_str().ok()?;
            let relative = path.strip_prefix(prefix)?;
            relative
                .ends_with(&suffix)
                .then(|| (relative.to_owned(), entry.oid))
        })
        .collect())
}

/// Compare two snapshots. Changes are sorted by path.
fn classify(old: &Snapshot, new: &Snapshot) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut added = Vec::new();

    for (path, id) in new {
        match old.get(path) {
            Some(previous) if previous == id => {}
            Some(_) => changes.push(Change::new(ChangeKind::Content, path)),
            None => added.push((path, id)),
        }
    }

    let mut removed: Vec<_> = old.iter().filter(|(path, _)| !new.contains_key(*path)).collect();

    for (path, id) in added {
        if let Some(pos) = removed.iter().position(|(_, old_id)| *old_id == id) {
            let (from, _) = removed.remove(pos);
            changes.push(Change::moved(ChangeKind::Renamed, path, from));
        } else if let Some((from, _)) = old.iter().find(|(_, old_id)| *old_id == id) {
            changes.push(Change::moved(ChangeKind::Copied, path, from));
        } else {
            changes.push(Change::new(ChangeKind::New, path));
        }
    }

    changes.extend(
        removed
            .into_iter()
            .map(|(path, _)| Change::new(ChangeKind::Deleted, path)),
    );
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

fn file_diff(repo: &Repository, old: &Snapshot, new: &Snapshot, change: &Change) -> Result<FileDiff> {
    let source = change.from.as_deref().unwrap_or(&change.path);
    let before = match change.change {
        ChangeKind::New => None,
        _ => old.get(source),
    };
    let after = match change.change {
        ChangeKind::Deleted => None,
        _ => new.get(&change.path),
    };

    Ok(FileDiff {
        path: change.path.clone(),
        diff: unified_diff(
            source,
            &change.path,
            &blob_text(repo, before)?,
            &blob_text(repo, after)?,
        ),
    })
}

fn blob_text(repo: &Repository, id: Option<&ObjectId>) -> Result<String> {
    let Some(id) = id else {
        return Ok(String::new());
    };
    let object = repo.find_object(*id)?;
    Ok(String::from_utf8_lossy(&object.data).into_owned())
}

fn unified_diff(from: &str, to: &str, before: &str, after: &str) -> String {
    let old_header = format!("a/{from}");
    let new_header = format!("b/{to}");
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string()
}

/// Write the changelog and the per-commit diffs configured in `[build]`.
///
/// The diff directory is rebuilt from scratch so deleted history does not
/// linger.
pub fn write_history(config: &SiteConfig, history: &History) -> Result<()> {
    let updates_path = config.updates_path();
    if let Some(parent) = updates_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(&history.updates)?;
    json.push('\n');
    fs::write(&updates_path, json)
        .with_context(|| format!("Failed to write '{}'", updates_path.display()))?;

    let diffs_dir = config.diffs_dir();
    if diffs_dir.exists() {
        fs::remove_dir_all(&diffs_dir)
            .with_context(|| format!("Failed to clear '{}'", diffs_dir.display()))?;
    }
    fs::create_dir_all(&diffs_dir)
        .with_context(|| format!("Failed to create directory '{}'", diffs_dir.display()))?;
    for (timestamp, diffs) in &history.diffs {
        let path = diffs_dir.join(format!("{timestamp}.json"));
        fs::write(&path, serde_json::to_string(diffs)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
    }

    log!(
        "updates";
        "wrote {} to {}",
        plural_count(history.updates.len(), "commit"),
        config.root_relative(&updates_path).display()
    );
    Ok(())
}
