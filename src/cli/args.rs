//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Tooling for hash-routed Markdown sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Posts directory (relative to site root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub posts: Option<String>,

    /// Config file path (default: site.toml)
    #[arg(short = 'C', long, global = true, default_value = "site.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site: config, page shell and a first post
    #[command(visible_alias = "i")]
    Init {
        /// Site directory name/path (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: Option<PathBuf>,
    },

    /// Generate the post index the menu is built from
    #[command(visible_alias = "x")]
    Index {
        #[command(flatten)]
        args: IndexArgs,
    },

    /// Check posts for broken routes, sections and file links
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },

    /// Route a fragment headlessly and print what the page would show
    Inspect {
        #[command(flatten)]
        args: InspectArgs,
    },
}

/// Index command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct IndexArgs {
    /// Print the index instead of writing it
    #[arg(long)]
    pub stdout: bool,

    /// Skip the changelog built from the posts' git history
    #[arg(long)]
    pub no_updates: bool,
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Posts or directories to check. If omitted, checks every post.
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Verify `#post:section` targets against the post's headings
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sections: Option<bool>,

    /// Verify links to site files
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub files: Option<bool>,

    /// Report problems as warnings instead of failing
    #[arg(long, short = 'w')]
    pub warn_only: bool,
}

/// Inspect command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// URL fragment to route, e.g. `#guides/setup:Installation`
    #[arg(allow_hyphen_values = true)]
    pub fragment: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}
