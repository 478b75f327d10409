//! Error types for the jobsift crate

use thiserror::Error;

/// Result type for jobsift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for jobsift operations
///
/// Extraction itself never surfaces these to callers: failed fetches,
/// candidates and probes are contained and logged. They show up where
/// configuration is read and where an analysis run persists its artifacts.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A page or feed could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Diagnostic artifact error
    #[error("Artifact error: {0}")]
    Artifact(String),
}
