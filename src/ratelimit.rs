//! Sliding-window rate limiting
//!
//! An injected service rather than a process-global map, so tests never share
//! state. Hits older than the window are evicted on every check.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `identifier` if it is under the limit. Returns
    /// false when the identifier has exhausted its window.
    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let recent = hits.entry(identifier.to_string()).or_default();
        recent.retain(|hit| now.duration_since(*hit) < self.window);
        if recent.len() >= self.max_requests {
            return false;
        }
        recent.push(now);
        hits.retain(|_, hits| !hits.is_empty());
        true
    }
}

impl Default for RateLimiter {
    /// 5 requests per 60 seconds, the registration form's limit.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}
