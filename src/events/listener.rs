use async_trait::async_trait;

use super::GateEvent;

/// Trait for handling gate events asynchronously.
///
/// Implement this trait to create custom event listeners. Listeners can
/// perform any async operation: logging, alerting the user, feeding a
/// diagnostics panel, etc.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::events::{GateEvent, Listener};
/// use async_trait::async_trait;
///
/// struct LoopAlertListener;
///
/// #[async_trait]
/// impl Listener for LoopAlertListener {
///     async fn handle(&self, event: &GateEvent) {
///         if let GateEvent::LoopDetected { path, severe: true, .. } = event {
///             // warn the user a redirect loop was broken
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle a gate event.
    ///
    /// This method is called for every event dispatched. Filter by
    /// matching on the event variant to handle specific events.
    async fn handle(&self, event: &GateEvent);
}
