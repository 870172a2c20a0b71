//! Durable key-value storage.
//!
//! Every component that persists state (rate windows, audit trail, the
//! mirrored credential) receives a [`DurableStore`] at construction
//! instead of reaching for an ambient singleton. Tests inject
//! [`InMemoryStore`]; production code supplies [`FileStore`] or its own
//! adapter over the platform's key-value API.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::GateError;

/// Plain-string key-value storage shared by the gate's components.
///
/// Keys are namespaced by convention (`rateLimit_<action>_<windowStart>`,
/// `auditLogs`, `authToken`); only the component that owns a key ever
/// writes it, so no cross-component locking is needed.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, GateError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), GateError>;

    /// Removes the value stored under `key`. Removing a missing key is
    /// not an error.
    async fn remove(&self, key: &str) -> Result<(), GateError>;
}
