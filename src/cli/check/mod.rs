//! `hashpage check`: find broken links in posts.
//!
//! | Link                     | Check                                        |
//! |--------------------------|----------------------------------------------|
//! | `https://…`, `mailto:…`  | skipped                                      |
//! | `#`, `#latest`           | always valid                                 |
//! | `#path[:section]`        | post exists, heading exists (`check.sections`)|
//! | anything else            | file exists under the site root (`check.files`)|
//!
//! Posts are displayed inside the root shell, so file links resolve against
//! the site root rather than the post's directory.

mod report;
mod scan;

use anyhow::{Result, bail};
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use rayon::prelude::*;
use std::path::PathBuf;

use super::CheckArgs;
use super::common::{collect_posts, resolve_posts};
use crate::config::{CheckSection, SiteConfig};
use hashpage::log;
use hashpage::request::Request;
use hashpage::router::LATEST_ROUTE;
use hashpage::utils::link::LinkKind;
use hashpage::utils::plural::plural_count;

pub use report::CheckReport;
use scan::{PostIndex, ScannedLink, scan_post};

/// Check the selected posts (all by default) and print a report.
pub fn check_site(config: &SiteConfig, args: &CheckArgs) -> Result<()> {
    let posts_dir = config.posts_dir();
    if !posts_dir.is_dir() {
        bail!("Posts directory not found: {}", posts_dir.display());
    }

    let all_posts = collect_posts(&posts_dir);
    let files = if args.paths.is_empty() {
        all_posts.clone()
    } else {
        resolve_posts(&args.paths, &posts_dir)?
    };

    if files.is_empty() {
        log!("check"; "no posts found");
        return Ok(());
    }

    log!("check"; "checking {}", plural_count(files.len(), "post"));

    let index = PostIndex::build(&posts_dir, &all_posts);
    let report = check_posts(config, &index, &files);

    report.print();
    log!("check"; "{}", report);

    finish(&report, config.check.warn_only)
}

/// Check every link of `files` against the site.
fn check_posts(config: &SiteConfig, index: &PostIndex, files: &[PathBuf]) -> CheckReport {
    let report = RwLock::new(CheckReport::default());

    files.par_iter().for_each(|file| {
        let source = config.root_relative(file).to_string_lossy().into_owned();
        match scan_post(file) {
            Ok(links) => check_links(&source, &links, config, index, &report),
            Err(e) => report.write().add_file(&source, &source, format!("{e:#}")),
        }
    });

    report.into_inner()
}

fn check_links(
    source: &str,
    links: &[ScannedLink],
    config: &SiteConfig,
    index: &PostIndex,
    report: &RwLock<CheckReport>,
) {
    for link in links {
        match link.kind() {
            LinkKind::External(_) => {}
            LinkKind::Route(fragment) => {
                if let Some(reason) = check_route(fragment, &config.check, index) {
                    report.write().add_route(source, &link.dest, reason);
                }
            }
            LinkKind::File(path) => {
                if !config.check.files || path.is_empty() {
                    continue;
                }
                let path = percent_decode_str(path).decode_utf8_lossy();
                if !config.root_join(path.as_ref()).exists() {
                    let reason = if link.image { "image not found" } else { "not found" };
                    report.write().add_file(source, &link.dest, reason);
                }
            }
        }
    }
}

/// Why a route link is broken, if it is.
fn check_route(fragment: &str, check: &CheckSection, index: &PostIndex) -> Option<&'static str> {
    let fragment = percent_decode_str(fragment).decode_utf8_lossy();
    let request = Request::parse(&fragment);

    if matches!(request.first_segment(), "" | LATEST_ROUTE) {
        return None;
    }

    let route = request.build_path();
    if !index.contains(&route) {
        return Some("post not found");
    }

    if check.sections
        && let Some(section) = &request.section
        && !index.has_section(&route, section)
    {
        return Some("section not found");
    }

    None
}

/// Fail unless the report is clean or only warnings were requested.
fn finish(report: &CheckReport, warn_only: bool) -> Result<()> {
    if report.is_clean() {
        return Ok(());
    }

    let summary = format!(
        "{} with broken links",
        plural_count(report.failing_posts(), "post")
    );
    if warn_only {
        log!("warning"; "{}", summary);
        Ok(())
    } else {
        bail!("found {}", summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(post: &str) -> (TempDir, SiteConfig) {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "posts/guides/setup.md", "# Setup\n\n## Install it\n");
        write(temp.path(), "posts/my notes.md", "# Notes\n");
        write(temp.path(), "images/logo.png", "");
        write(temp.path(), "posts/source.md", post);

        let mut config = SiteConfig::default();
        config.set_root(temp.path());
        (temp, config)
    }

    fn run(config: &SiteConfig) -> CheckReport {
        let posts_dir = config.posts_dir();
        let posts = collect_posts(&posts_dir);
        let index = PostIndex::build(&posts_dir, &posts);
        check_posts(config, &index, &[posts_dir.join("source.md")])
    }

    #[test]
    fn test_valid_links_pass() {
        let (_temp, config) = site(
            "[a](#guides/setup) [b](<#guides/setup:Install it>) [c](#guides/setup^1) \
             [d](#latest) [e](#) [f](https://example.com) ![g](/images/logo.png) \
             ![h](./images/logo.png?v=2) [i](#my%20notes)\n",
        );
        let report = run(&config);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_missing_post() {
        let (_temp, config) = site("[a](#guides/missing) [b](#guides)\n");
        let report = run(&config);

        let errors = &report.routes["posts/source.md"];
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.reason == "post not found"));
    }

    #[test]
    fn test_missing_section() {
        let (_temp, config) = site("[a](#guides/setup:Install)\n");
        let report = run(&config);

        let errors = &report.routes["posts/source.md"];
        assert_eq!(errors[0].target, "`#guides/setup:Install`");
        assert_eq!(errors[0].reason, "section not found");
    }

    #[test]
    fn test_section_check_can_be_disabled() {
        let (_temp, mut config) = site("[a](#guides/setup:Install)\n");
        config.check.sections = false;
        assert!(run(&config).is_clean());
    }

    #[test]
    fn test_missing_file() {
        let (_temp, mut config) = site("![a](images/missing.png) [b](files/doc.pdf)\n");
        let report = run(&config);
        assert_eq!(report.file_error_count(), 2);

        config.check.files = false;
        assert!(run(&config).is_clean());
    }

    #[test]
    fn test_finish() {
        let mut report = CheckReport::default();
        assert!(finish(&report, false).is_ok());

        report.add_route("posts/a.md", "#x", "post not found");
        assert!(finish(&report, true).is_ok());
        let err = finish(&report, false).unwrap_err();
        assert_eq!(err.to_string(), "found 1 post with broken links");
    }
}
