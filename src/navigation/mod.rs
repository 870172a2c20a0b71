//! Navigation loop detection.
//!
//! Repeated rapid visits to the same path are the client-observable
//! symptom of both UI redirect bugs and automated route-enumeration
//! probing; the two cannot be told apart client-side, so a severe loop
//! triggers a soft recovery (redirect to a safe default), never a
//! lockout. Lockout belongs server-side.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::config::{LoopConfig, RoutePolicy};
use crate::events::{dispatch, GateEvent};

/// Classification of a navigation intent against the recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopClassification {
    None,
    Loop(u32),
    SevereLoop(u32),
}

impl LoopClassification {
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::SevereLoop(_))
    }
}

/// Observes navigation intents and flags repeated visits to the same
/// destination within a bounded history window.
///
/// Error pages are exempt from ever classifying as [`SevereLoop`]: a user
/// reloading a legitimate error page is not an attacker.
///
/// [`SevereLoop`]: LoopClassification::SevereLoop
#[derive(Clone)]
pub struct NavigationLoopDetector {
    history: Arc<Mutex<VecDeque<String>>>,
    config: LoopConfig,
    routes: RoutePolicy,
}

impl NavigationLoopDetector {
    pub fn new(config: LoopConfig, routes: RoutePolicy) -> Self {
        Self {
            history: Arc::new(Mutex::new(VecDeque::with_capacity(config.history_capacity))),
            config,
            routes,
        }
    }

    /// Records `path` in the history and classifies the visit.
    pub async fn observe(&self, path: &str) -> LoopClassification {
        let count = {
            let Ok(mut history) = self.history.lock() else {
                // poisoned history cannot classify anything; treat as quiet
                return LoopClassification::None;
            };

            history.push_back(path.to_owned());
            while history.len() > self.config.history_capacity {
                history.pop_front();
            }

            u32::try_from(history.iter().filter(|p| *p == path).count()).unwrap_or(u32::MAX)
        };

        let classification = if count >= self.config.severe_threshold
            && !self.routes.is_error_page(path)
        {
            LoopClassification::SevereLoop(count)
        } else if count >= self.config.loop_threshold {
            LoopClassification::Loop(count)
        } else {
            LoopClassification::None
        };

        if classification != LoopClassification::None {
            dispatch(GateEvent::LoopDetected {
                path: path.to_owned(),
                count,
                severe: classification.is_severe(),
                at: Utc::now(),
            })
            .await;
        }

        classification
    }

    /// Number of paths currently retained.
    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}
