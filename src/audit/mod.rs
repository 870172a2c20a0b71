//! Append-only, capped audit trail.
//!
//! A debugging and forensics aid, not a compliance-grade log: it lives
//! client-side and is trivially clearable by the end user. Consumers can
//! only append and list; eviction is bulk FIFO once the cap is reached.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::DurableStore;
use crate::GateError;

/// Store key the serialized trail lives under.
pub const AUDIT_LOG_KEY: &str = "auditLogs";

/// A single security-relevant occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub principal_id: Option<String>,
    pub action: String,
    pub resource: Option<String>,
    pub success: bool,
    pub detail: Option<String>,
}

/// Capped (FIFO) durable log of [`AuditEvent`]s.
///
/// Persistence is best-effort: a failed storage write is dropped silently
/// and counted, never surfaced to the caller. The in-memory copy is
/// always appended so the trail stays useful while storage is down.
#[derive(Clone)]
pub struct AuditTrail {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    store: Arc<dyn DurableStore>,
    capacity: usize,
    errors: Arc<AtomicU64>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new(store: Arc<dyn DurableStore>, capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            store,
            capacity,
            errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a trail hydrated from a previously persisted payload.
    ///
    /// An unreadable or corrupt payload starts the trail empty; hydration
    /// never fails.
    pub async fn load(store: Arc<dyn DurableStore>, capacity: usize) -> Self {
        let trail = Self::new(store, capacity);
        trail.hydrate().await;
        trail
    }

    /// Re-reads the persisted payload into memory.
    pub async fn hydrate(&self) {
        let persisted: Vec<AuditEvent> = match self.store.get(AUDIT_LOG_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => return,
            Err(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!(target: "gatehouse::audit", "audit hydration failed: {e}");
                return;
            }
        };

        if let Ok(mut events) = self.events.lock() {
            *events = persisted.into_iter().collect();
            while events.len() > self.capacity {
                events.pop_front();
            }
        }
    }

    /// Appends an event with a generated timestamp, evicting oldest-first
    /// past capacity, then persists the whole trail.
    pub async fn record(
        &self,
        principal_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        success: bool,
        detail: Option<String>,
    ) {
        let event = AuditEvent {
            timestamp: Utc::now(),
            principal_id,
            action: action.into(),
            resource,
            success,
            detail,
        };

        let snapshot = {
            let Ok(mut events) = self.events.lock() else {
                self.errors.fetch_add(1, Ordering::Relaxed);
                return;
            };
            events.push_back(event);
            while events.len() > self.capacity {
                events.pop_front();
            }
            events.iter().cloned().collect::<Vec<_>>()
        };

        if let Err(e) = self.persist(&snapshot).await {
            self.errors.fetch_add(1, Ordering::Relaxed);
            log::warn!(target: "gatehouse::audit", "audit write dropped: {e}");
        }
    }

    /// Returns all retained events, oldest first.
    pub fn list(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage failures swallowed so far.
    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    async fn persist(&self, snapshot: &[AuditEvent]) -> Result<(), GateError> {
        let raw = serde_json::to_string(snapshot)
            .map_err(|e| GateError::Serialization(e.to_string()))?;
        self.store.put(AUDIT_LOG_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;

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

    #[tokio::test]
    async fn test_record_and_list_oldest_first() {
        let trail = AuditTrail::new(Arc::new(InMemoryStore::new()), 1_000);

        trail
            .record(Some("u1".to_owned()), "login", None, true, None)
            .await;
        trail
            .record(
                Some("u1".to_owned()),
                "auth_redirect",
                Some("/campaigns".to_owned()),
                false,
                None,
            )
            .await;

        let events = trail.list();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "login");
        assert_eq!(events[1].action, "auth_redirect");
        assert_eq!(events[1].resource.as_deref(), Some("/campaigns"));
        assert!(!events[1].success);
    }

    #[tokio::test]
    async fn test_cap_evicts_oldest() {
        let trail = AuditTrail::new(Arc::new(InMemoryStore::new()), 1_000);

        for n in 0..1_050 {
            trail.record(None, format!("event_{n}"), None, true, None).await;
        }

        let events = trail.list();
        assert_eq!(events.len(), 1_000);
        assert_eq!(events[0].action, "event_50");
        assert_eq!(events[999].action, "event_1049");
    }

    #[tokio::test]
    async fn test_persisted_and_hydrated() {
        let store = Arc::new(InMemoryStore::new());

        {
            let trail = AuditTrail::new(store.clone(), 1_000);
            trail
                .record(Some("u1".to_owned()), "loop_break", None, false, None)
                .await;
        }

        let trail = AuditTrail::load(store, 1_000).await;
        let events = trail.list();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "loop_break");
    }

    #[tokio::test]
    async fn test_corrupt_payload_starts_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.put(AUDIT_LOG_KEY, "not json").await.unwrap();

        let trail = AuditTrail::load(store, 1_000).await;
        assert!(trail.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_dropped_and_counted() {
        let trail = AuditTrail::new(Arc::new(BrokenStore), 1_000);

        trail.record(None, "login", None, true, None).await;

        // the in-memory copy still has the event
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.error_count(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_respects_capacity() {
        let store = Arc::new(InMemoryStore::new());

        {
            let trail = AuditTrail::new(store.clone(), 1_000);
            for n in 0..10 {
                trail.record(None, format!("event_{n}"), None, true, None).await;
            }
        }

        let trail = AuditTrail::load(store, 5).await;
        let events = trail.list();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].action, "event_5");
    }
}
