//! Fixed-window per-client request limiter.
//!
//! Each client key gets `max_requests` per `window`. The window starts at the
//! client's first request and resets once it has elapsed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window; zero disables limiting.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(3600),
        }
    }
}

impl RateLimitConfig {
    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0 && !self.window.is_zero()
    }
}

/// Counter for one client within its current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Rejected request: how long until the client's window resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exceeded {
    pub retry_after: Duration,
}

impl Exceeded {
    /// Whole seconds, rounded up, never zero.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 || secs == 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Fixed-window limiter keyed by client identity (normally the IP).
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Count a request for `key`, or report how long it must wait.
    pub async fn check(&self, key: &str) -> Result<(), Exceeded> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), Exceeded> {
        if !self.config.is_enabled() {
            return Ok(());
        }

        let mut windows = self.windows.write().await;
        windows.retain(|_, w| now.duration_since(w.started) < self.config.window);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if window.count >= self.config.max_requests {
            let retry_after = self
                .config
                .window
                .saturating_sub(now.duration_since(window.started));
            warn!(client = key, retry_after = ?retry_after, "Rate limit exceeded");
            return Err(Exceeded { retry_after });
        }

        window.count += 1;
        debug!(
            client = key,
            used = window.count,
            limit = self.config.max_requests,
            "Rate limit slot taken"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(secs),
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = limiter(3, 60);
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", now).await.is_ok());
        }
        let err = limiter.check_at("1.2.3.4", now).await.unwrap_err();
        assert_eq!(err.retry_after, Duration::from_secs(60));
        assert_eq!(err.retry_after_secs(), 60);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("a", now).await.is_ok());
        assert!(limiter.check_at("a", now).await.is_err());
        assert!(limiter.check_at("b", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = limiter(1, 60);
        let start = Instant::now();
        assert!(limiter.check_at("a", start).await.is_ok());

        let err = limiter
            .check_at("a", start + Duration::from_secs(45))
            .await
            .unwrap_err();
        assert_eq!(err.retry_after_secs(), 15);

        assert!(limiter
            .check_at("a", start + Duration::from_secs(60))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_zero_disables() {
        let limiter = limiter(0, 60);
        for _ in 0..100 {
            assert!(limiter.check("a").await.is_ok());
        }
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let e = Exceeded {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(e.retry_after_secs(), 2);
        let e = Exceeded {
            retry_after: Duration::ZERO,
        };
        assert_eq!(e.retry_after_secs(), 1);
    }
}
