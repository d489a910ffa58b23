//! Site configuration management for `site.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # [site], [build], [check]
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── util       # config discovery, path checks
//! └── mod.rs     # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `[site]`  | Page title and the `#latest` placeholder         |
//! | `[build]` | Posts, post index and changelog locations        |
//! | `[check]` | Link checks performed by `hashpage check`        |

mod error;
pub mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{BuildSection, CheckSection, SiteSection};

use util::find_config_file;

use crate::cli::{CheckArgs, Cli, Commands};
use anyhow::{Context, Result, bail};
use hashpage::log;
use hashpage::router::RouterOptions;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub check: CheckSection,
}

impl SiteConfig {
    /// Load configuration for the parsed command line.
    ///
    /// `init` targets the (new) site directory and never reads a config.
    /// Every other command searches upward from cwd; the site root is the
    /// directory holding the config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        if let Commands::Init { name } = &cli.command {
            let root = match name {
                Some(name) => cwd.join(name),
                None => cwd,
            };
            let mut config = Self::default();
            config.config_path = root.join(&cli.config);
            if let Some(title) = name.as_deref().and_then(Path::file_name) {
                config.site.title = title.to_string_lossy().into_owned();
            }
            config.set_root(&root);
            config.apply_command_options(cli);
            config.validate()?;
            return Ok(config);
        }

        let Some(config_path) = find_config_file(&cwd, &cli.config) else {
            bail!(
                "Config file '{}' not found. Run 'hashpage init' to create a new site.",
                cli.config.display()
            );
        };

        let mut config = Self::from_path(&config_path)?;
        config.set_root(config_path.parent().unwrap_or(Path::new(".")));
        config.config_path = config_path;
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute posts directory.
    pub fn posts_dir(&self) -> PathBuf {
        self.root_join(&self.build.posts)
    }

    /// Absolute post index file.
    pub fn index_path(&self) -> PathBuf {
        self.root_join(&self.build.index)
    }

    /// Absolute changelog file.
    pub fn updates_path(&self) -> PathBuf {
        self.root_join(&self.build.updates)
    }

    /// Absolute directory of per-commit diffs.
    pub fn diffs_dir(&self) -> PathBuf {
        self.root_join(&self.build.diffs)
    }

    /// What the browser client will use for this site.
    pub fn router_options(&self) -> RouterOptions {
        let mut options = RouterOptions {
            posts: self.build.posts.trim_start_matches("./").to_owned(),
            index: self.build.index.trim_start_matches("./").to_owned(),
            updates: self.build.updates.trim_start_matches("./").to_owned(),
            ..RouterOptions::default()
        };
        if let Some(latest) = &self.site.latest {
            options.latest_html = latest.clone();
        }
        options
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.build.posts, cli.posts.as_ref());

        if let Commands::Check { args } = &cli.command {
            self.apply_check_args(args);
        }
    }

    /// CLI flags override the `[check]` section.
    fn apply_check_args(&mut self, args: &CheckArgs) {
        Self::update_option(&mut self.check.sections, args.sections.as_ref());
        Self::update_option(&mut self.check.files, args.files.as_ref());
        if args.warn_only {
            self.check.warn_only = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.build.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::from_str("[site\ntitle = \"Notes\"").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.site.title, "Notes");
        assert_eq!(config.build.posts, "posts");
        assert_eq!(config.build.index, "post_index.json");
        assert_eq!(config.build.updates, "updates.json");
        assert_eq!(config.build.diffs, "update_diffs");
        assert!(config.check.sections);
        assert!(!config.check.warn_only);
    }

    #[test]
    fn test_parse_sections() {
        let config = SiteConfig::from_str(
            "[site]\ntitle = \"Wiki\"\nlatest = \"<p>hi</p>\"\n\n[build]\nposts = \"content\"\n\n[check]\nfiles = false\n",
        )
        .unwrap();
        assert_eq!(config.site.title, "Wiki");
        assert_eq!(config.build.posts, "content");
        assert!(!config.check.files);

        let options = config.router_options();
        assert_eq!(options.posts, "content");
        assert_eq!(options.index, "post_index.json");
        assert_eq!(options.latest_html, "<p>hi</p>");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.site.title, "Test");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[site]\ntitle = \"Test\"\n[build]\nposts = \"posts\"";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = SiteConfig::default();
        config.build.posts = "/abs".into();
        config.build.index = String::new();

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_check_args_override_config() {
        let cli = Cli::parse_from([
            "hashpage",
            "--posts",
            "notes",
            "check",
            "--sections",
            "false",
            "--warn-only",
        ]);
        let mut config = SiteConfig::default();
        config.apply_command_options(&cli);

        assert_eq!(config.build.posts, "notes");
        assert!(!config.check.sections);
        assert!(config.check.files);
        assert!(config.check.warn_only);
    }

    #[test]
    fn test_paths_follow_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/srv/site"));
        assert_eq!(config.posts_dir(), Path::new("/srv/site/posts"));
        assert_eq!(config.index_path(), Path::new("/srv/site/post_index.json"));
        assert_eq!(config.updates_path(), Path::new("/srv/site/updates.json"));
        assert_eq!(config.diffs_dir(), Path::new("/srv/site/update_diffs"));
        assert_eq!(
            config.root_relative("/srv/site/posts/a.md"),
            Path::new("posts/a.md")
        );
    }
}
