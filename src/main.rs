//! hashpage - tooling for hash-routed Markdown sites.

#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(not(target_arch = "wasm32"))]
mod config;
#[cfg(not(target_arch = "wasm32"))]
mod embed;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::{ColorChoice, Parser};
    use cli::{Cli, Commands};
    use config::SiteConfig;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    hashpage::logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Init { .. } => cli::init::new_site(&config),
        Commands::Index { args } => cli::index::write_index(&config, args),
        Commands::Check { args } => cli::check::check_site(&config, args),
        Commands::Inspect { args } => cli::inspect::inspect(&config, args),
    }
}

// The browser build only ships the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
