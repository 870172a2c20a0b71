use async_trait::async_trait;

use crate::events::{GateEvent, Listener};

/// Emits gate events as tracing events.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::register_event_listeners;
/// use gatehouse::events::listeners::TracingListener;
///
/// register_event_listeners(|registry| {
///     registry.listen(TracingListener);
/// });
/// ```
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &GateEvent) {
        tracing::info!(
            target: "gatehouse::events",
            event_name = event.name(),
            ?event,
            "gate event"
        );
    }
}
