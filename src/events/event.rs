use chrono::{DateTime, Utc};

/// Events emitted by the gate, session and rate limiter.
///
/// Events are always fired. If no listeners are registered, they are
/// silently ignored (no-op). Register listeners via
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum GateEvent {
    // decisions
    NavigationAllowed {
        path: String,
        at: DateTime<Utc>,
    },
    NavigationRedirected {
        path: String,
        target: String,
        at: DateTime<Utc>,
    },
    NavigationDenied {
        path: String,
        reason: String,
        at: DateTime<Utc>,
    },

    // anomalies
    LoopDetected {
        path: String,
        count: u32,
        severe: bool,
        at: DateTime<Utc>,
    },
    RateLimitExceeded {
        action: String,
        at: DateTime<Utc>,
    },

    // session lifecycle
    SessionEstablished {
        principal_id: String,
        at: DateTime<Utc>,
    },
    SessionCleared {
        at: DateTime<Utc>,
    },
}

impl GateEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NavigationAllowed { .. } => "gate.allowed",
            Self::NavigationRedirected { .. } => "gate.redirected",
            Self::NavigationDenied { .. } => "gate.denied",
            Self::LoopDetected { .. } => "nav.loop_detected",
            Self::RateLimitExceeded { .. } => "rate.exceeded",
            Self::SessionEstablished { .. } => "session.established",
            Self::SessionCleared { .. } => "session.cleared",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::NavigationAllowed { at, .. }
            | Self::NavigationRedirected { at, .. }
            | Self::NavigationDenied { at, .. }
            | Self::LoopDetected { at, .. }
            | Self::RateLimitExceeded { at, .. }
            | Self::SessionEstablished { at, .. }
            | Self::SessionCleared { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let now = Utc::now();

        assert_eq!(
            GateEvent::NavigationAllowed {
                path: "/dashboard".to_owned(),
                at: now
            }
            .name(),
            "gate.allowed"
        );

        assert_eq!(
            GateEvent::NavigationRedirected {
                path: "/campaigns".to_owned(),
                target: "/login".to_owned(),
                at: now
            }
            .name(),
            "gate.redirected"
        );

        assert_eq!(
            GateEvent::NavigationDenied {
                path: "/admin".to_owned(),
                reason: "admin_required".to_owned(),
                at: now
            }
            .name(),
            "gate.denied"
        );

        assert_eq!(
            GateEvent::LoopDetected {
                path: "/campaigns".to_owned(),
                count: 10,
                severe: true,
                at: now
            }
            .name(),
            "nav.loop_detected"
        );

        assert_eq!(
            GateEvent::RateLimitExceeded {
                action: "route-access".to_owned(),
                at: now
            }
            .name(),
            "rate.exceeded"
        );

        assert_eq!(
            GateEvent::SessionEstablished {
                principal_id: "u1".to_owned(),
                at: now
            }
            .name(),
            "session.established"
        );

        assert_eq!(
            GateEvent::SessionCleared { at: now }.name(),
            "session.cleared"
        );
    }

    #[test]
    fn test_event_timestamp() {
        let now = Utc::now();
        let event = GateEvent::SessionCleared { at: now };
        assert_eq!(event.timestamp(), now);
    }
}
