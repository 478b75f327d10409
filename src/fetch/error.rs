//! Error types for the fetch module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("Timed out fetching {url}")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// The connection could not be established or broke mid-request
    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed {
        /// Requested URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// The response body could not be read or decoded
    #[error("Unreadable body from {url}: {reason}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// The URL could not be parsed
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    /// Classify a transport error raised while requesting `url`
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_decode() || err.is_body() {
            FetchError::Body {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            FetchError::ConnectionFailed {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Status code for `HttpStatus` failures
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        CrateError::Fetch(err.to_string())
    }
}
