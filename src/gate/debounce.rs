//! Coalescing of rapid repeated navigation intents.
//!
//! Each intent carries a monotonically increasing id. Consecutive intents
//! for the same path inside the coalesce window reuse the previous
//! limiter verdict instead of consuming budget again; a verdict arriving
//! for a superseded id is discarded. Explicit id comparison replaces
//! implicit timer cancellation, so the scheme holds under any concurrency
//! model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
struct Verdict {
    id: u64,
    path: String,
    at: DateTime<Utc>,
    allowed: bool,
}

/// Request-id debouncer for the route-access budget check.
#[derive(Clone)]
pub(super) struct Debounce {
    window: Duration,
    next_id: Arc<AtomicU64>,
    last: Arc<Mutex<Option<Verdict>>>,
}

impl Debounce {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            next_id: Arc::new(AtomicU64::new(1)),
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Allocates the id for a new navigation intent.
    pub(super) fn next_intent(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the cached verdict if `path` was checked within the
    /// coalesce window.
    pub(super) fn cached(&self, path: &str, now: DateTime<Utc>) -> Option<bool> {
        let last = self.last.lock().ok()?;
        last.as_ref()
            .filter(|v| v.path == path && now - v.at <= self.window)
            .map(|v| v.allowed)
    }

    /// Records a verdict, unless a newer intent already recorded one.
    pub(super) fn record(&self, id: u64, path: &str, at: DateTime<Utc>, allowed: bool) {
        if let Ok(mut last) = self.last.lock() {
            let stale = last.as_ref().is_some_and(|v| v.id > id);
            if !stale {
                *last = Some(Verdict {
                    id,
                    path: path.to_owned(),
                    at,
                    allowed,
                });
            }
        }
    }
}
