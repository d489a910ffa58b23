//! `Fetch` over the browser's HTTP stack.

use gloo_net::http::Request;

use crate::fetch::{Fetch, FetchError, check_status};

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(FetchError::transport)?;

        check_status(response.status())?;

        response.text().await.map_err(FetchError::transport)
    }
}
