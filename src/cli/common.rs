//! Post discovery shared by `index` and `check`.

use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use jwalk::WalkDir;

use hashpage::request::PATH_DELIMITER;

/// Extension of post files.
pub const POST_EXTENSION: &str = "md";

pub fn is_post(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == POST_EXTENSION)
}

/// Collect every post under `dir`, sorted, skipping hidden entries.
pub fn collect_posts(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| is_post(path))
        .collect()
}

/// Route of a post: its path below `posts_dir`, `/`-separated, without
/// extension. `None` for files outside `posts_dir`.
///
/// ```text
/// posts/guides/setup.md  ->  guides/setup
/// ```
pub fn post_route(posts_dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(posts_dir).ok()?.with_extension("");

    let segments = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    (!segments.is_empty()).then(|| segments.join(&PATH_DELIMITER.to_string()))
}

/// Resolve command-line paths to post files.
///
/// Each path may be a post or a directory of posts, given either as is or
/// relative to the posts directory.
pub fn resolve_posts(paths: &[PathBuf], posts_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut posts = Vec::new();

    for path in paths {
        let resolved = if path.exists() {
            path.clone()
        } else {
            posts_dir.join(path)
        };

        if resolved.is_file() {
            if !is_post(&resolved) {
                bail!("Not a Markdown post: {}", path.display());
            }
            posts.push(resolved);
        } else if resolved.is_dir() {
            posts.extend(collect_posts(&resolved));
        } else {
            bail!(
                "Path not found: {}\n  Tried:\n    - {}\n    - {}",
                path.display(),
                path.display(),
                posts_dir.join(path).display()
            );
        }
    }

    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let temp = TempDir::new().unwrap();
        let posts = temp.path().join("posts");
        fs::create_dir_all(posts.join("guides")).unwrap();
        fs::create_dir_all(posts.join(".drafts")).unwrap();
        fs::write(posts.join("about.md"), "# About").unwrap();
        fs::write(posts.join("guides/setup.md"), "# Setup").unwrap();
        fs::write(posts.join("guides/notes.txt"), "plain").unwrap();
        fs::write(posts.join(".drafts/wip.md"), "# WIP").unwrap();
        temp
    }

    #[test]
    fn test_collect_posts_skips_hidden_and_non_markdown() {
        let temp = site();
        let posts = temp.path().join("posts");

        let routes: Vec<_> = collect_posts(&posts)
            .iter()
            .filter_map(|p| post_route(&posts, p))
            .collect();
        assert_eq!(routes, vec!["about", "guides/setup"]);
    }

    #[test]
    fn test_post_route() {
        let posts = Path::new("/site/posts");
        assert_eq!(
            post_route(posts, Path::new("/site/posts/guides/setup.md")).as_deref(),
            Some("guides/setup")
        );
        assert_eq!(post_route(posts, Path::new("/elsewhere/a.md")), None);
    }

    #[test]
    fn test_resolve_posts() {
        let temp = site();
        let posts = temp.path().join("posts");

        let resolved = resolve_posts(&[PathBuf::from("guides")], &posts).unwrap();
        assert_eq!(resolved, vec![posts.join("guides/setup.md")]);

        let resolved = resolve_posts(&[PathBuf::from("about.md")], &posts).unwrap();
        assert_eq!(resolved, vec![posts.join("about.md")]);

        assert!(resolve_posts(&[PathBuf::from("guides/notes.txt")], &posts).is_err());
        assert!(resolve_posts(&[PathBuf::from("missing.md")], &posts).is_err());
    }
}
