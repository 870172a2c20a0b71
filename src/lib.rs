pub mod audit;
pub mod config;
pub mod crypto;
pub mod events;
pub mod gate;
pub mod navigation;
pub mod rate_limit;
pub mod secret;
pub mod session;
pub mod store;

pub use audit::{AuditEvent, AuditTrail};
pub use config::GateConfig;
pub use events::register_event_listeners;
pub use gate::{AccessDecision, AccessGate, DenyReason, RouteClass, RouteSpec};
pub use navigation::{LoopClassification, NavigationLoopDetector};
pub use rate_limit::{ActionRateLimiter, Usage};
pub use secret::SecretString;
pub use session::{Profile, SecurityLevel, SessionArtifacts, SessionState};
pub use store::{DurableStore, FileStore, InMemoryStore};

use std::fmt;

/// Errors raised by the storage-facing internals of the gate.
///
/// These never cross the [`AccessGate`] boundary: every failure mode
/// degrades to an [`AccessDecision`] instead. Storage errors fail open in
/// the rate limiter and are swallowed-and-counted in the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub enum GateError {
    /// The durable key-value store could not be read or written.
    StorageUnavailable(String),
    /// A persisted payload could not be serialized or parsed.
    Serialization(String),
    /// An internal lock was poisoned by a panicking writer.
    LockPoisoned,
}

impl std::error::Error for GateError {}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::StorageUnavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            GateError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            GateError::LockPoisoned => write!(f, "Internal lock poisoned"),
        }
    }
}
