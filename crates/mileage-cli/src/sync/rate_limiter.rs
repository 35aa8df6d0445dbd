//! Inter-page delay as rate-limit courtesy to the upstream API

use std::time::{Duration, Instant};

/// Enforces a minimum delay between consecutive page fetches
pub struct RateLimiter {
    /// Minimum delay between requests
    min_delay: Duration,
    /// Last request timestamp
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a rate limiter with the given minimum delay
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: None,
        }
    }

    /// Wait until the minimum delay since the previous request has passed
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                tokio::time::sleep(self.min_delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
