//! # API Endpoint Probing
//!
//! Opportunistic discovery of structured feeds. A fixed list of
//! conventional paths is requested against a site; successful responses
//! are recorded with a short body sample so an operator can decide whether
//! a board is worth a feed-backed source.
//!
//! Probing never fails. A path that errors, times out or answers with a
//! non-success status is simply absent from the results.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::dom::truncate_chars;
use crate::fetch::Fetcher;

/// Paths requested by `probe_endpoints`, in order
pub const DEFAULT_PROBE_PATHS: &[&str] = &[
    "/api/jobs",
    "/api/companies",
    "/graphql",
    "/api/v1/jobs",
    "/jobs.json",
    "/data/jobs",
];

/// Maximum number of characters kept from a probed body
pub const SAMPLE_CHARS: usize = 500;

/// One successful probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Probed URL
    pub url: String,

    /// Response status code
    pub http_status: u16,

    /// Content-Type header, empty when absent
    pub content_type: String,

    /// Declared as JSON and parsed as JSON
    pub is_json: bool,

    /// Leading part of the body
    pub sample: String,
}

/// Probe the conventional API paths of `base`
pub async fn probe_endpoints(fetcher: &Fetcher, base: &str) -> Vec<ProbeResult> {
    probe_paths(fetcher, base, DEFAULT_PROBE_PATHS).await
}

/// Probe `paths` of `base` one after another
#[instrument(skip(fetcher, paths), fields(count = paths.len()))]
pub async fn probe_paths(fetcher: &Fetcher, base: &str, paths: &[&str]) -> Vec<ProbeResult> {
    let base = base.trim_end_matches('/');
    let mut results = Vec::new();

    for path in paths {
        let url = format!("{}{}", base, path);
        let page = match fetcher.get(&url).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                continue;
            }
        };

        if !(200..300).contains(&page.status) {
            debug!("Probe of {} answered HTTP {}", url, page.status);
            continue;
        }

        let is_json = page.content_type.to_lowercase().contains("json")
            && serde_json::from_str::<serde_json::Value>(&page.body).is_ok();

        info!("Found endpoint {} (HTTP {}, json: {})", url, page.status, is_json);
        results.push(ProbeResult {
            url,
            http_status: page.status,
            content_type: page.content_type,
            is_json,
            sample: truncate_chars(&page.body, SAMPLE_CHARS),
        });
    }

    info!("Probing {} found {} endpoints", base, results.len());
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::CrawlerConfig;
    use mockito::Server;

    fn fetcher() -> Fetcher {
        let config = CrawlerConfig::builder().delay_ms(0).timeout_secs(5).build();
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_only_json_feed_is_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/jobs.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jobs": [{"title": "Engineer"}]}"#)
            .create_async()
            .await;
        // Every other path is unmatched and answered with 501.

        let results = probe_endpoints(&fetcher(), &server.url()).await;

        mock.assert_async().await;
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.url, format!("{}/jobs.json", server.url()));
        assert_eq!(result.http_status, 200);
        assert!(result.is_json);
        assert!(result.sample.contains("Engineer"));
    }

    #[tokio::test]
    async fn test_declared_json_must_parse() {
        let mut server = Server::new_async().await;
        let _html = server
            .mock("GET", "/api/jobs")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>{}</html>")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/data/jobs")
            .with_status(404)
            .create_async()
            .await;

        let results = probe_endpoints(&fetcher(), &format!("{}/", server.url())).await;

        let found: Vec<(&str, bool)> = results
            .iter()
            .map(|r| (r.url.trim_start_matches(&server.url()), r.is_json))
            .collect();
        assert_eq!(found, vec![("/api/jobs", false), ("/graphql", false)]);
    }

    #[tokio::test]
    async fn test_sample_is_truncated() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/jobs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", "1,".repeat(600) + "1"))
            .create_async()
            .await;

        let results = probe_paths(&fetcher(), &server.url(), &["/data/jobs"]).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_json);
        assert_eq!(results[0].sample.chars().count(), SAMPLE_CHARS);
    }

    #[tokio::test]
    async fn test_unreachable_site_yields_nothing() {
        let results = probe_paths(&fetcher(), "http://127.0.0.1:9", &["/api/jobs"]).await;
        assert!(results.is_empty());
    }
}
