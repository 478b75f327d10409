//! HTTP session used by one source parser
//!
//! The session carries the configured headers and timeout across every
//! request it makes and waits on the shared host limiter before each one.
//! It never retries; retry policy belongs to the caller.

use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::config::CrawlerConfig;
use crate::fetch::error::FetchError;
use crate::fetch::limiter::HostRateLimiter;

/// A fetched response body with the metadata extraction needs
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    /// Final URL after redirects
    pub url: String,

    /// Response status code
    pub status: u16,

    /// Content-Type header, empty when absent
    pub content_type: String,

    /// Response body
    pub body: String,
}

impl RawPage {
    /// Build a page from markup that did not come off the network
    pub fn from_markup(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            content_type: "text/html".to_string(),
            body: body.into(),
        }
    }
}

/// HTTP session with reused headers and a fixed timeout
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: ReqwestClient,
    limiter: HostRateLimiter,
}

impl Fetcher {
    /// Create a session from the crawler configuration
    ///
    /// The session gets its own politeness limiter; use `with_limiter` to
    /// share one across sources.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Self::with_limiter(config, HostRateLimiter::new(config.delay()))
    }

    /// Create a session waiting on a shared host limiter
    pub fn with_limiter(config: &CrawlerConfig, limiter: HostRateLimiter) -> Result<Self> {
        let client = ReqwestClient::builder()
            .default_headers(config.headers()?)
            .timeout(config.timeout())
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client, limiter })
    }

    /// GET `url`, failing on transport errors and non-success statuses
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> std::result::Result<RawPage, FetchError> {
        let page = self.get(url).await?;
        if !(200..300).contains(&page.status) {
            warn!("HTTP {} from {}", page.status, url);
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: page.status,
            });
        }
        Ok(page)
    }

    /// GET `url` and return the response whatever its status
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, url: &str) -> std::result::Result<RawPage, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if let Some(host) = parsed.host_str() {
            self.limiter.until_ready(host).await;
        }

        debug!("Sending GET request to {}", url);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        debug!("Received {} bytes from {} (HTTP {})", body.len(), url, status);
        Ok(RawPage {
            url: final_url,
            status,
            content_type,
            body,
        })
    }

    /// GET `url` and decode a successful JSON body into `T`
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<T, FetchError> {
        let page = self.fetch(url).await?;
        serde_json::from_str(&page.body).map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: format!("Failed to parse response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestResponse {
        message: String,
    }

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .user_agent("jobsift-test")
            .timeout_secs(5)
            .delay_ms(0)
            .build()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_configured_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/jobs")
            .match_header("user-agent", "jobsift-test")
            .match_header("accept-language", "en-US,en;q=0.9")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html><title>Jobs</title></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let page = fetcher.fetch(&format!("{}/jobs", server.url())).await.unwrap();

        assert_eq!(page.status, 200);
        assert!(page.content_type.starts_with("text/html"));
        assert!(page.body.contains("<title>Jobs</title>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;

        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 404, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_returns_non_success_responses() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(410)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let page = fetcher.get(&format!("{}/gone", server.url())).await.unwrap();
        assert_eq!(page.status, 410);
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"message\": \"success\"}")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let response: TestResponse = fetcher
            .fetch_json(&format!("{}/api", server.url()))
            .await
            .unwrap();
        assert_eq!(response.message, "success");
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_html() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let result: std::result::Result<TestResponse, _> =
            fetcher.fetch_json(&format!("{}/api", server.url())).await;
        assert!(matches!(result, Err(FetchError::Body { .. })));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = CrawlerConfig::builder().delay_ms(0).timeout_secs(1).build();
        let fetcher = Fetcher::new(&config).unwrap();
        let result = fetcher.fetch(&format!("http://{}/", addr)).await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_classified() {
        let fetcher = Fetcher::new(&test_config()).unwrap();
        // Port 9 (discard) is closed on test machines.
        let result = fetcher.fetch("http://127.0.0.1:9/jobs").await;
        assert!(matches!(result, Err(FetchError::ConnectionFailed { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = Fetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
