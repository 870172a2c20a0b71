//! Event system for gate decisions and session changes.
//!
//! Events are fired from the gate, the session and the rate limiter. If
//! no listeners are registered, they are silently ignored (zero
//! overhead).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gatehouse::register_event_listeners;
//! use gatehouse::events::listeners::LoggingListener;
//!
//! fn main() {
//!     // register listeners at startup
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//!
//!     // decisions will now be logged
//! }
//! ```
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to create custom event handlers:
//!
//! ```rust,ignore
//! use gatehouse::events::{GateEvent, Listener};
//! use async_trait::async_trait;
//!
//! struct DenialAlertListener;
//!
//! #[async_trait]
//! impl Listener for DenialAlertListener {
//!     async fn handle(&self, event: &GateEvent) {
//!         if let GateEvent::NavigationDenied { path, reason, .. } = event {
//!             // surface the denial to the user
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::GateEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners};
