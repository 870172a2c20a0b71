//! In-memory key-value storage.
//!
//! Suitable for tests and single-session usage where persistence across
//! restarts is not required.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::GateError;

use super::DurableStore;

/// In-memory [`DurableStore`] backed by a `HashMap` behind a `RwLock`.
///
/// Contents are lost when the process exits. For persistent storage, use
/// [`FileStore`](super::FileStore).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        let entries = self.entries.read().map_err(|_| GateError::LockPoisoned)?;

        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), GateError> {
        self.entries
            .write()
            .map_err(|_| GateError::LockPoisoned)?
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), GateError> {
        self.entries
            .write()
            .map_err(|_| GateError::LockPoisoned)?
            .remove(key);

        Ok(())
    }
}
