//! Per-host politeness limiter shared by every fetcher of a run

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug_span};

/// Keyed rate limiter: at most one request per `delay` to any single host
#[derive(Clone)]
pub struct HostRateLimiter {
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl std::fmt::Debug for HostRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRateLimiter")
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}

impl HostRateLimiter {
    /// Create a limiter spacing requests to one host by `delay`
    ///
    /// A zero delay disables limiting.
    pub fn new(delay: Duration) -> Self {
        let limiter = Quota::with_period(delay)
            .map(|quota| Arc::new(RateLimiter::keyed(quota)));
        Self { limiter }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// Wait until a request to `host` is allowed
    pub async fn until_ready(&self, host: &str) {
        if let Some(limiter) = &self.limiter {
            limiter
                .until_key_ready(&host.to_string())
                .instrument(debug_span!("politeness", host = %host))
                .await;
        }
    }
}
