//! Check report types and formatting.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;

use hashpage::utils::plural::plural_s;

/// A single broken link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    /// The link that failed.
    pub target: String,
    pub reason: String,
}

/// Broken links grouped by source post
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Route errors (missing posts, missing sections).
    pub routes: BTreeMap<String, Vec<LinkError>>,
    /// File errors (missing site files, unreadable posts).
    pub files: BTreeMap<String, Vec<LinkError>>,
}

impl CheckReport {
    pub fn add_route(&mut self, source: &str, link: &str, reason: impl Into<String>) {
        Self::add(&mut self.routes, source, link, reason.into());
    }

    pub fn add_file(&mut self, source: &str, link: &str, reason: impl Into<String>) {
        Self::add(&mut self.files, source, link, reason.into());
    }

    fn add(
        errors: &mut BTreeMap<String, Vec<LinkError>>,
        source: &str,
        link: &str,
        reason: String,
    ) {
        errors.entry(source.to_owned()).or_default().push(LinkError {
            target: format!("`{link}`"),
            reason,
        });
    }

    pub fn route_error_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn file_error_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.routes.is_empty() && self.files.is_empty()
    }

    /// Posts with at least one error.
    pub fn failing_posts(&self) -> usize {
        let mut sources: Vec<_> = self.routes.keys().chain(self.files.keys()).collect();
        sources.sort_unstable();
        sources.dedup();
        sources.len()
    }

    /// Print the full report to stderr (routes -> files).
    pub fn print(&self) {
        Self::print_section("routes", &self.routes);
        Self::print_section("files", &self.files);
    }

    fn print_section(name: &str, errors: &BTreeMap<String, Vec<LinkError>>) {
        if errors.is_empty() {
            return;
        }
        eprintln!();

        let file_count = errors.len();
        let error_count: usize = errors.values().map(Vec::len).sum();

        eprintln!(
            "{} {}",
            name.red().bold(),
            format!(
                "({file_count} post{}, {error_count} error{})",
                plural_s(file_count),
                plural_s(error_count)
            )
            .dimmed()
        );

        for (path, errs) in errors {
            eprintln!("{}{}{}", "[".dimmed(), path.cyan(), "]".dimmed());
            for e in errs {
                eprintln!("{} {} {}", "→".red(), e.target, e.reason);
            }
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.route_error_count() + self.file_error_count();

        if total == 0 {
            write!(f, "{}", "all links valid".green())
        } else {
            write!(
                f,
                "{} {} {}",
                "found".dimmed(),
                total.to_string().red().bold(),
                format!("broken link{}", plural_s(total)).dimmed()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = CheckReport::default();
        assert!(report.is_clean());

        report.add_route("posts/a.md", "#missing", "post not found");
        report.add_route("posts/a.md", "#b:Nope", "section not found");
        report.add_file("posts/a.md", "img/x.png", "not found");
        report.add_file("posts/b.md", "img/y.png", "not found");

        assert_eq!(report.route_error_count(), 2);
        assert_eq!(report.file_error_count(), 2);
        assert_eq!(report.failing_posts(), 2);
        assert_eq!(report.routes["posts/a.md"][0].target, "`#missing`");
    }
}
