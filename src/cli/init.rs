//! `hashpage init`: scaffold a new site.
//!
//! ```text
//! <root>/
//! ├── site.toml
//! ├── index.html          # page shell
//! ├── post_index.json     # generated from posts/
//! └── posts/
//!     └── welcome.md
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::index::{build_index, render_index};
use crate::config::SiteConfig;
use crate::embed::init::{
    ConfigVars, INDEX_HTML, SITE_TOML, ShellVars, WELCOME_MD, WelcomeVars,
};
use hashpage::log;

/// Page shell file name.
const SHELL_FILE: &str = "index.html";
const WELCOME_FILE: &str = "welcome.md";

/// Create a new site at the configured root.
///
/// Refuses to run over an existing config; other existing files are kept.
pub fn new_site(config: &SiteConfig) -> Result<()> {
    if config.config_path.exists() {
        bail!(
            "'{}' already exists, refusing to overwrite it",
            config.config_path.display()
        );
    }

    let root = config.root();
    fs::create_dir_all(config.posts_dir())
        .with_context(|| format!("Failed to create site directory '{}'", root.display()))?;

    write_new(
        &config.config_path,
        &SITE_TOML.render(&ConfigVars::from_config(config)),
    )?;
    write_new(
        &root.join(SHELL_FILE),
        &INDEX_HTML.render(&ShellVars::from_config(config)),
    )?;
    write_new(
        &config.posts_dir().join(WELCOME_FILE),
        &WELCOME_MD.render(&WelcomeVars {
            posts: config.build.posts.clone(),
        }),
    )?;

    let index = render_index(&build_index(&config.posts_dir())?)?;
    fs::write(config.index_path(), index)
        .with_context(|| format!("Failed to write '{}'", config.index_path().display()))?;

    log!("init"; "site initialized at {}", root.display());
    Ok(())
}

/// Write `content` unless the file is already there.
fn write_new(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        log!("init"; "keeping existing {}", path.display());
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))
}
