//! Content fetching contract.
//!
//! A fetch is single-shot: no retry, no timeout, no cancellation. Superseded
//! results are discarded by the router, not by the fetcher.

use std::future::Future;

use thiserror::Error;

/// Failure of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {0}")]
    Status(u16),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
}

impl FetchError {
    /// HTTP 404, reported to the user as a missing page.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }

    /// Wrap any failure that happened before a status was known.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Accept a response status, rejecting everything outside 2xx.
pub fn check_status(status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status(status))
    }
}

/// Asynchronous GET of a text resource.
pub trait Fetch {
    /// Resolve with the body on any 2xx status.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use dir::DirFetcher;

#[cfg(not(target_arch = "wasm32"))]
mod dir {
    use std::io::ErrorKind;
    use std::path::{Component, Path, PathBuf};

    use super::{Fetch, FetchError};

    /// Serves URLs from a site directory on disk, the way a static file
    /// server would.
    #[derive(Debug, Clone)]
    pub struct DirFetcher {
        root: PathBuf,
    }

    impl DirFetcher {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }

        /// Map a site-relative URL onto the root, rejecting escapes.
        fn resolve(&self, url: &str) -> Option<PathBuf> {
            let path = url.split(['?', '#']).next().unwrap_or_default();
            let decoded = percent_encoding::percent_decode_str(path).decode_utf8_lossy();
            let relative = Path::new(decoded.trim_start_matches('/'));

            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            (!escapes).then(|| self.root.join(relative))
        }
    }

    impl Fetch for DirFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            let Some(path) = self.resolve(url) else {
                return Err(FetchError::Status(404));
            };

            match tokio::fs::read_to_string(&path).await {
                Ok(text) => Ok(text),
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                    Err(FetchError::Status(404))
                }
                Err(e) => Err(FetchError::Transport(format!("{}: {e}", path.display()))),
            }
        }
    }

}
