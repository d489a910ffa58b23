//! hashpage - hash-routed single-page Markdown site.
//!
//! The library holds everything shared by the browser client and the
//! command line tooling: fragment parsing, Markdown rendering, the
//! navigation menu and the router state machine. The `web` module drives
//! the router from a real page when compiled to WebAssembly.

pub mod fetch;
pub mod logger;
pub mod markdown;
pub mod menu;
pub mod request;
pub mod router;
pub mod updates;
pub mod utils;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod web;
