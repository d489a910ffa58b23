//! Command-line interface module.

mod args;
pub mod changelog;
pub mod check;
pub mod common;
pub mod index;
pub mod init;
pub mod inspect;

pub use args::{CheckArgs, Cli, Commands, IndexArgs, InspectArgs};
