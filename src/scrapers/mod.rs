//! Page fetching and HTML extraction for comic hosts.

pub mod extract;
mod http_client;

pub use extract::{
    is_absolute_url, resolve_url, select_anchors, select_images, url_extension, Anchor,
    ExtractError,
};
pub use http_client::{FetchedPage, HttpClient, HttpClientConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        FetchError::Request {
            url: url.to_string(),
            source,
        }
    }

    /// URL that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. } | FetchError::Status { url, .. } => url,
        }
    }

    /// Connection and timeout failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => source.is_connect() || source.is_timeout(),
            FetchError::Status { .. } => false,
        }
    }
}

/// Something that can GET a URL.
///
/// Implemented by [`HttpClient`]; tests substitute in-memory hosts.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
