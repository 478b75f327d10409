//! # Crawler Configuration Module
//!
//! This module provides the configuration handed to every source parser by
//! its caller: request headers, timeouts, politeness delay, pagination
//! bound and the optional keyword filter. It uses a builder pattern for
//! flexible configuration and can be overlaid from the environment.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration
//!
//! ## Environment
//!
//! - `REQUEST_TIMEOUT`: request timeout in seconds
//! - `REQUEST_DELAY`: delay between requests to one host, in (fractional) seconds
//! - `USER_AGENT`: user agent header

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::warn;

use crate::error::{Error, Result};

/// Browser-like user agent; several boards reject obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Accept header for page fetches
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Accept-Language header for page fetches
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Configuration for the crawler
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlerConfig {
    /// User agent to use for requests
    pub user_agent: String,

    /// Accept header
    pub accept: String,

    /// Accept-Language header
    pub accept_language: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Minimum delay between two requests to the same host, in milliseconds
    pub delay_ms: u64,

    /// Maximum number of listing pages to paginate through
    pub max_pages: u32,

    /// Keywords for search-style queries
    pub keywords: Vec<String>,

    /// Maximum number of sources crawled at the same time
    pub max_concurrent_sources: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_secs: 30,
            delay_ms: 1000,
            max_pages: 1,
            keywords: Vec::new(),
            max_concurrent_sources: 4,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: CrawlerConfig) -> Self {
        Self { config }
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the Accept header
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.accept = accept.into();
        self
    }

    /// Set the Accept-Language header
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.accept_language = accept_language.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the politeness delay in milliseconds
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.delay_ms = delay_ms;
        self
    }

    /// Set the maximum number of pages to paginate through
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the keyword filter
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.config.keywords = keywords;
        self
    }

    /// Set how many sources may be crawled concurrently
    pub fn max_concurrent_sources(mut self, max: usize) -> Self {
        self.config.max_concurrent_sources = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Defaults overlaid with `REQUEST_TIMEOUT`, `REQUEST_DELAY` and `USER_AGENT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("REQUEST_TIMEOUT") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout_secs = secs,
                Err(e) => warn!("Ignoring REQUEST_TIMEOUT={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("REQUEST_DELAY") {
            match raw.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                    config.delay_ms = (secs * 1000.0).round() as u64;
                }
                Ok(_) => warn!("Ignoring negative REQUEST_DELAY={:?}", raw),
                Err(e) => warn!("Ignoring REQUEST_DELAY={:?}: {}", raw, e),
            }
        }

        if let Some(agent) = lookup("USER_AGENT").filter(|agent| !agent.trim().is_empty()) {
            config.user_agent = agent;
        }

        config
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the politeness delay as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Default headers sent with every request of a session
    pub fn headers(&self) -> Result<HeaderMap> {
        let value = |name: &str, raw: &str| {
            HeaderValue::from_str(raw)
                .map_err(|e| Error::Config(format!("invalid {} header {:?}: {}", name, raw, e)))
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value("User-Agent", &self.user_agent)?);
        headers.insert(ACCEPT, value("Accept", &self.accept)?);
        headers.insert(ACCEPT_LANGUAGE, value("Accept-Language", &self.accept_language)?);
        Ok(headers)
    }
}
