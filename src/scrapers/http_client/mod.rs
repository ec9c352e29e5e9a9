//! HTTP client with request timeout and transport-level retries.

mod response;

pub use response::FetchedPage;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{FetchError, Fetcher};

/// Transport settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    /// Extra attempts after a connect or timeout failure.
    pub retries: u32,
    pub retry_delay: Duration,
    pub user_agent: Option<String>,
}

const CRATE_USER_AGENT: &str = concat!("mangacrawl/", env!("CARGO_PKG_VERSION"));

/// Sent for `user_agent = "impersonate"`, for hosts that turn away non-browsers.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0";

impl HttpClientConfig {
    /// Value of the `User-Agent` header.
    ///
    /// Unset means the crate's own agent, `impersonate` a desktop browser, and
    /// anything else is sent verbatim.
    pub fn user_agent_header(&self) -> &str {
        match self.user_agent.as_deref().map(str::trim) {
            None | Some("") => CRATE_USER_AGENT,
            Some(ua) if ua.eq_ignore_ascii_case("impersonate") => BROWSER_USER_AGENT,
            Some(ua) => ua,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(100),
            retries: 10,
            retry_delay: Duration::from_millis(500),
            user_agent: None,
        }
    }
}

/// `reqwest`-backed fetcher shared by every task of a run.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(config: &HttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent_header())
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            retries: config.retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Single GET attempt: send, check status, read the body.
    async fn fetch_once(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content = response
            .bytes()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        Ok(FetchedPage::new(final_url, content.to_vec()))
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => {
                    debug!("GET {} -> {} bytes", url, page.len());
                    return Ok(page);
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "GET {} failed ({}), retry {}/{}",
                        url, e, attempt, self.retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per accepted connection.
    async fn serve(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/chapter-1/", addr)
    }

    fn test_client(retries: u32) -> HttpClient {
        HttpClient::new(&HttpClientConfig {
            timeout: Duration::from_secs(5),
            retries,
            retry_delay: Duration::from_millis(1),
            user_agent: None,
        })
        .unwrap()
    }

    #[test]
    fn test_user_agent_header() {
        let mut config = HttpClientConfig::default();
        assert!(config.user_agent_header().starts_with("mangacrawl/"));

        config.user_agent = Some("impersonate".to_string());
        assert!(config.user_agent_header().contains("Firefox"));

        config.user_agent = Some("MyBot/1.0".to_string());
        assert_eq!(config.user_agent_header(), "MyBot/1.0");

        config.user_agent = Some("  ".to_string());
        assert!(config.user_agent_header().starts_with("mangacrawl/"));
    }

    #[tokio::test]
    async fn test_get_success() {
        let url = serve("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
        let page = test_client(0).get(&url).await.unwrap();
        assert_eq!(page.url, url);
        assert_eq!(page.text(), "hello");
    }

    #[tokio::test]
    async fn test_get_error_status() {
        let url =
            serve("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let err = test_client(3).get(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried_then_surfaced() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = test_client(2)
            .get(&format!("http://{}/", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(err.is_retryable());
    }
}
