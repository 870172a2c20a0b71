//! Fixed-window per-action rate limiting.
//!
//! Windows are discrete, non-overlapping buckets (per minute by default):
//! simple and cheap, at the cost of up to a 2x burst at window
//! boundaries. Acceptable here because this is advisory UX throttling,
//! not a security control. Superseded windows are left behind in the
//! store as harmless garbage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::RateLimitConfig;
use crate::events::{dispatch, GateEvent};
use crate::store::DurableStore;
use crate::GateError;

/// Cumulative in-process limiter counters since construction.
///
/// These are not read back from durable storage; they feed the
/// elevated-activity heuristic on high-security routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Total `try_consume` calls.
    pub requests: u64,
    /// Total storage failures (each one failed open).
    pub errors: u64,
}

/// Fixed-window per-action request counter over a [`DurableStore`].
///
/// On a storage failure the limiter fails open: the call is allowed and
/// the error counter is bumped. Availability wins over strictness for a
/// non-authoritative control.
#[derive(Clone)]
pub struct ActionRateLimiter {
    store: Arc<dyn DurableStore>,
    config: RateLimitConfig,
    requests: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl ActionRateLimiter {
    pub fn new(store: Arc<dyn DurableStore>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            requests: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Consumes one unit of budget for `action` in the current window.
    ///
    /// Returns `false` only when the window's ceiling is already reached;
    /// storage failures return `true`.
    pub async fn try_consume(&self, action: &str) -> bool {
        self.try_consume_at(action, Utc::now()).await
    }

    /// Window arithmetic entry point; `now` is injectable so window
    /// rollover is testable.
    pub async fn try_consume_at(&self, action: &str, now: DateTime<Utc>) -> bool {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let key = self.window_key(action, now);
        match self.consume(&key).await {
            Ok(allowed) => {
                if !allowed {
                    dispatch(GateEvent::RateLimitExceeded {
                        action: action.to_owned(),
                        at: now,
                    })
                    .await;
                }
                allowed
            }
            Err(e) => {
                // fail open
                self.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "gatehouse::rate_limit", "store failure, failing open: {e}");
                true
            }
        }
    }

    /// Returns the cumulative in-process counters.
    pub fn usage(&self) -> Usage {
        Usage {
            requests: self.requests.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn window_key(&self, action: &str, now: DateTime<Utc>) -> String {
        let window_secs = self.config.window_secs();
        let window_start = now.timestamp().div_euclid(window_secs) * window_secs;
        format!("rateLimit_{action}_{window_start}")
    }

    async fn consume(&self, key: &str) -> Result<bool, GateError> {
        let count: u32 = self
            .store
            .get(key)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        if count >= self.config.max_per_window {
            return Ok(false);
        }

        self.store.put(key, &(count + 1).to_string()).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;
    use chrono::Duration;

    struct BrokenStore;

    #[async_trait]
    impl DurableStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, GateError> {
            Err(GateError::StorageUnavailable("down".to_owned()))
        }
        async fn put(&self, _key: &str, _value: &str) -> Result<(), GateError> {
            Err(GateError::StorageUnavailable("down".to_owned()))
        }
        async fn remove(&self, _key: &str) -> Result<(), GateError> {
            Err(GateError::StorageUnavailable("down".to_owned()))
        }
    }

    fn limiter_with_ceiling(max: u32) -> ActionRateLimiter {
        let store = Arc::new(InMemoryStore::new());
        let config = RateLimitConfig {
            max_per_window: max,
            ..Default::default()
        };
        ActionRateLimiter::new(store, config)
    }

    #[tokio::test]
    async fn test_ceiling_enforced_within_window() {
        let limiter = limiter_with_ceiling(100);
        let now = Utc::now();

        let mut allowed = 0;
        for _ in 0..101 {
            if limiter.try_consume_at("route-access", now).await {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 100);
        // further calls in the same window stay blocked
        assert!(!limiter.try_consume_at("route-access", now).await);
    }

    #[tokio::test]
    async fn test_next_window_resets_count() {
        let limiter = limiter_with_ceiling(2);
        let now = Utc::now();

        assert!(limiter.try_consume_at("a", now).await);
        assert!(limiter.try_consume_at("a", now).await);
        assert!(!limiter.try_consume_at("a", now).await);

        let next_window = now + Duration::seconds(60);
        assert!(limiter.try_consume_at("a", next_window).await);
    }

    #[tokio::test]
    async fn test_actions_counted_independently() {
        let limiter = limiter_with_ceiling(1);
        let now = Utc::now();

        assert!(limiter.try_consume_at("a", now).await);
        assert!(!limiter.try_consume_at("a", now).await);
        assert!(limiter.try_consume_at("b", now).await);
    }

    #[tokio::test]
    async fn test_fails_open_on_storage_error() {
        let limiter = ActionRateLimiter::new(Arc::new(BrokenStore), RateLimitConfig::default());

        for _ in 0..5 {
            assert!(limiter.try_consume("route-access").await);
        }

        let usage = limiter.usage();
        assert_eq!(usage.requests, 5);
        assert_eq!(usage.errors, 5);
    }

    #[tokio::test]
    async fn test_usage_counts_blocked_requests() {
        let limiter = limiter_with_ceiling(1);
        let now = Utc::now();

        limiter.try_consume_at("a", now).await;
        limiter.try_consume_at("a", now).await;

        let usage = limiter.usage();
        assert_eq!(usage.requests, 2);
        assert_eq!(usage.errors, 0);
    }

    #[tokio::test]
    async fn test_window_key_layout() {
        let limiter = limiter_with_ceiling(100);
        let now = DateTime::from_timestamp(125, 0).unwrap();

        let key = limiter.window_key("route-access", now);
        assert_eq!(key, "rateLimit_route-access_120");
    }
}
