//! Sliding-window limiter for sign-in attempts, keyed by client IP.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window_secs: u64) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Records an attempt for `key` and reports whether it is within the limit.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut attempts = self.attempts.write().await;
        let history = attempts.entry(key.to_string()).or_default();

        while history
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            history.pop_front();
        }

        if history.len() < self.max_attempts {
            history.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops keys with no attempts inside the window. Returns how many remain.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, history| {
            history.retain(|t| now.duration_since(*t) < self.window);
            !history.is_empty()
        });
        attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_per_key() {
        let limiter = RateLimiter::new(3, 60);

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn window_slides() {
        let limiter = RateLimiter::new(1, 60);
        let start = Instant::now();

        assert!(limiter.check_at("ip", start).await);
        assert!(!limiter.check_at("ip", start + Duration::from_secs(30)).await);
        assert!(limiter.check_at("ip", start + Duration::from_secs(61)).await);
    }

    #[tokio::test]
    async fn cleanup_drops_idle_keys() {
        let limiter = RateLimiter::new(5, 1);
        limiter.check("ip1").await;
        limiter.check("ip2").await;

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(limiter.cleanup().await, 0);
    }
}
