//! # Fetch Module
//!
//! HTTP acquisition for the extraction core: a configured session per
//! source parser, typed fetch failures, and a per-host politeness limiter
//! shared across concurrently running sources.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Headers, timeout, delay, pagination bound and keywords
//! - `Fetcher`: Session issuing GET requests and returning `RawPage`s
//! - `FetchError`: Timeout, connection, status and body failures
//! - `HostRateLimiter`: `governor`-backed keyed limiter, one key per host
//!
//! Fetch failures are recoverable: callers log them and substitute empty
//! results for the page they were fetching.

mod client;
mod config;
mod error;
mod limiter;

pub use client::{Fetcher, RawPage};
pub use config::{
    CrawlerConfig, CrawlerConfigBuilder, DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE,
    DEFAULT_USER_AGENT,
};
pub use error::FetchError;
pub use limiter::HostRateLimiter;
