//! The access gate: one decision per navigation intent.
//!
//! On each intent the gate classifies the route, consults the loop
//! detector, the rate limiter and the session, and produces exactly one
//! [`AccessDecision`]. It never returns an error into the routing layer:
//! every failure mode degrades to a decision, and protected route classes
//! degrade toward the least powerful state.

mod debounce;
mod decision;
mod route;

pub use decision::{AccessDecision, DenyReason};
pub use route::{Elevated, RouteClass, RouteSpec};

use std::sync::Arc;

use chrono::Utc;

use crate::audit::AuditTrail;
use crate::config::{GateConfig, HighSecurityConfig, RoutePolicy};
use crate::events::{dispatch, GateEvent};
use crate::navigation::{LoopClassification, NavigationLoopDetector};
use crate::rate_limit::{ActionRateLimiter, Usage};
use crate::session::SessionState;
use crate::store::DurableStore;

use debounce::Debounce;

/// Action name the per-navigation budget is counted under.
pub const ROUTE_ACCESS_ACTION: &str = "route-access";

struct AuditEntry {
    action: &'static str,
    success: bool,
    detail: Option<String>,
}

/// A decision plus the single audit entry it emits. `Loading` is the one
/// decision that carries no entry.
type Verdict = (AccessDecision, Option<AuditEntry>);

fn allowed() -> Verdict {
    (
        AccessDecision::Allowed,
        Some(AuditEntry {
            action: "route_access",
            success: true,
            detail: None,
        }),
    )
}

/// Orchestrates session state, rate limiting, loop detection and the
/// audit trail into a single per-navigation decision.
pub struct AccessGate {
    session: SessionState,
    limiter: ActionRateLimiter,
    detector: NavigationLoopDetector,
    audit: AuditTrail,
    routes: RoutePolicy,
    high_security: HighSecurityConfig,
    developer_bypass: bool,
    debounce: Debounce,
}

impl AccessGate {
    /// Wires up a gate and its components over one durable store.
    pub fn new(config: GateConfig, store: Arc<dyn DurableStore>) -> Self {
        Self {
            session: SessionState::new(store.clone()),
            limiter: ActionRateLimiter::new(store.clone(), config.rate_limit),
            detector: NavigationLoopDetector::new(config.loop_detection, config.routes.clone()),
            audit: AuditTrail::new(store, config.audit_capacity),
            routes: config.routes,
            high_security: config.high_security,
            developer_bypass: config.developer_bypass,
            debounce: Debounce::new(config.debounce.coalesce_window),
        }
    }

    /// Re-reads the persisted audit trail into memory.
    pub async fn hydrate(&self) {
        self.audit.hydrate().await;
    }

    /// The session handle; the authentication collaborator mirrors
    /// credential/profile changes through this.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The audit trail, for forensics views.
    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// The rate limiter, for collaborators throttling their own actions.
    pub fn limiter(&self) -> &ActionRateLimiter {
        &self.limiter
    }

    /// Cumulative limiter counters.
    pub fn usage(&self) -> Usage {
        self.limiter.usage()
    }

    /// Appends a collaborator-supplied audit event under the current
    /// principal.
    pub async fn record_event(
        &self,
        action: impl Into<String>,
        resource: Option<String>,
        success: bool,
        detail: Option<String>,
    ) {
        self.audit
            .record(self.session.principal_id(), action, resource, success, detail)
            .await;
    }

    /// Evaluates one navigation intent.
    ///
    /// Runs synchronously to completion: no partial state is observable
    /// between two evaluations, so rapid back-and-forth navigation cannot
    /// corrupt counters or history. Every non-`Loading` decision appends
    /// exactly one audit event.
    pub async fn evaluate(&self, spec: RouteSpec, path: &str) -> AccessDecision {
        // the upstream fetch has not resolved: no decision, no side effects
        if self.session.is_profile_loading() {
            return AccessDecision::Loading;
        }

        let route = RouteClass::from(spec);
        let classification = self.detector.observe(path).await;

        // clears an inconsistent session (inactive profile) before the
        // rules read profile state
        let _ = self.session.is_valid().await;

        let (mut decision, entry) = self.run_rules(route, path).await;

        // Loading carries no audit entry: the intent is still in flight
        let Some(mut entry) = entry else {
            return decision;
        };

        // a severe loop on a non-error page overrides any other result:
        // the soft recovery must win or a redirect loop between the gate
        // and its own redirect target could never be broken
        if let LoopClassification::SevereLoop(count) = classification {
            if !self.routes.is_error_page(path) {
                decision = AccessDecision::Redirected {
                    target: self.routes.default_path.clone(),
                    from: None,
                };
                entry = AuditEntry {
                    action: "loop_break",
                    success: false,
                    detail: Some(format!("visits={count}")),
                };
            }
        }

        self.audit
            .record(
                self.session.principal_id(),
                entry.action,
                Some(path.to_owned()),
                entry.success,
                entry.detail,
            )
            .await;
        self.emit(&decision, path).await;

        decision
    }

    async fn run_rules(&self, route: RouteClass, path: &str) -> Verdict {
        // a poisoned session can no longer attest who the visitor is.
        // privileged route classes fail toward the least powerful state;
        // the remaining classes fall through the cascade, whose accessors
        // already degrade to the anonymous view
        if self.session.is_broken()
            && matches!(route, RouteClass::AdminOnly | RouteClass::HighSecurity(_))
        {
            return (
                AccessDecision::Denied(DenyReason::SessionUnavailable),
                Some(AuditEntry {
                    action: "access_denied",
                    success: false,
                    detail: Some(DenyReason::SessionUnavailable.as_str().to_owned()),
                }),
            );
        }

        // rule 1: operational escape hatch for unconstrained routes
        if route == RouteClass::Public && self.developer_bypass {
            return (
                AccessDecision::Allowed,
                Some(AuditEntry {
                    action: "route_access",
                    success: true,
                    detail: Some("developer_bypass".to_owned()),
                }),
            );
        }

        // rule 2: per-navigation budget; coalesced across rapid repeats
        if !self.debounced_consume(path).await {
            return (
                AccessDecision::Denied(DenyReason::RateLimited),
                Some(AuditEntry {
                    action: "rate_limited",
                    success: false,
                    detail: None,
                }),
            );
        }

        match route {
            RouteClass::Public => self.guest_gate(path),
            RouteClass::Authenticated => self.auth_gate(path).unwrap_or_else(allowed),
            RouteClass::AdminOnly => self.admin_gate(path),
            RouteClass::HighSecurity(base) => {
                let upstream = match base {
                    Elevated::Authenticated => self.auth_gate(path),
                    Elevated::AdminOnly => {
                        let out = self.admin_gate(path);
                        if out.0.is_allowed() {
                            None
                        } else {
                            Some(out)
                        }
                    }
                };
                if let Some(out) = upstream {
                    return out;
                }
                self.activity_gate()
            }
        }
    }

    /// Guest-only handling: an authenticated visitor is bounced back to
    /// the dashboard unless the page is explicitly public.
    fn guest_gate(&self, path: &str) -> Verdict {
        if self.session.has_profile() && !self.routes.is_public_page(path) {
            (
                AccessDecision::Redirected {
                    target: self.routes.default_path.clone(),
                    from: None,
                },
                Some(AuditEntry {
                    action: "guest_redirect",
                    success: false,
                    detail: None,
                }),
            )
        } else {
            allowed()
        }
    }

    /// `None` means the visitor passes; `Some` carries the short-circuit
    /// result. Error pages render without a redirect so a legitimate 404
    /// does not look like a logout.
    fn auth_gate(&self, path: &str) -> Option<Verdict> {
        if self.session.has_profile() {
            return None;
        }

        if self.routes.is_error_page(path) {
            return Some(allowed());
        }

        Some((
            AccessDecision::Redirected {
                target: self.routes.login_path.clone(),
                from: Some(path.to_owned()),
            },
            Some(AuditEntry {
                action: "auth_redirect",
                success: false,
                detail: None,
            }),
        ))
    }

    fn admin_gate(&self, path: &str) -> Verdict {
        // profile fetch race: a credential without a profile must wait,
        // not flash a false denial
        if self.session.has_credential() && !self.session.has_profile() {
            return (AccessDecision::Loading, None);
        }

        if let Some(out) = self.auth_gate(path) {
            return out;
        }

        if self.session.is_admin() {
            allowed()
        } else {
            (
                AccessDecision::Denied(DenyReason::AdminRequired),
                Some(AuditEntry {
                    action: "access_denied",
                    success: false,
                    detail: Some(DenyReason::AdminRequired.as_str().to_owned()),
                }),
            )
        }
    }

    fn activity_gate(&self) -> Verdict {
        let usage = self.limiter.usage();
        let errors = usage.errors + self.audit.error_count();

        if usage.requests > self.high_security.max_requests
            || errors > self.high_security.max_errors
        {
            (
                AccessDecision::Denied(DenyReason::ElevatedActivity),
                Some(AuditEntry {
                    action: "access_denied",
                    success: false,
                    detail: Some(format!(
                        "{}: requests={} errors={}",
                        DenyReason::ElevatedActivity.as_str(),
                        usage.requests,
                        errors
                    )),
                }),
            )
        } else {
            allowed()
        }
    }

    async fn debounced_consume(&self, path: &str) -> bool {
        let now = Utc::now();
        if let Some(verdict) = self.debounce.cached(path, now) {
            return verdict;
        }

        let id = self.debounce.next_intent();
        let verdict = self.limiter.try_consume(ROUTE_ACCESS_ACTION).await;
        self.debounce.record(id, path, now, verdict);
        verdict
    }

    async fn emit(&self, decision: &AccessDecision, path: &str) {
        let at = Utc::now();
        let event = match decision {
            AccessDecision::Allowed => GateEvent::NavigationAllowed {
                path: path.to_owned(),
                at,
            },
            AccessDecision::Redirected { target, .. } => GateEvent::NavigationRedirected {
                path: path.to_owned(),
                target: target.clone(),
                at,
            },
            AccessDecision::Denied(reason) => GateEvent::NavigationDenied {
                path: path.to_owned(),
                reason: reason.as_str().to_owned(),
                at,
            },
            AccessDecision::Loading => return,
        };
        dispatch(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Profile;
    use crate::store::InMemoryStore;
    use crate::SecretString;

    fn gate() -> AccessGate {
        AccessGate::new(GateConfig::default(), Arc::new(InMemoryStore::new()))
    }

    async fn sign_in(gate: &AccessGate, profile: Profile) {
        gate.session()
            .set_credential(Some(SecretString::new("tok")))
            .await;
        gate.session().set_profile(Some(profile)).await;
    }

    #[tokio::test]
    async fn test_public_route_allows_anonymous() {
        let gate = gate();
        let decision = gate.evaluate(RouteSpec::public(), "/pricing").await;
        assert_eq!(decision, AccessDecision::Allowed);
    }

    #[tokio::test]
    async fn test_guest_route_bounces_authenticated_user() {
        let gate = gate();
        sign_in(&gate, Profile::new("u1")).await;

        let decision = gate.evaluate(RouteSpec::public(), "/signup").await;
        assert_eq!(decision.redirect_target(), Some("/dashboard"));

        // explicitly public pages stay reachable
        let decision = gate.evaluate(RouteSpec::public(), "/pricing").await;
        assert_eq!(decision, AccessDecision::Allowed);
    }

    #[tokio::test]
    async fn test_developer_bypass_only_covers_unconstrained_routes() {
        let store: Arc<dyn DurableStore> = Arc::new(InMemoryStore::new());
        let gate = AccessGate::new(GateConfig::development(), store);
        sign_in(&gate, Profile::new("u1")).await;

        // bypass wins over the guest redirect
        let decision = gate.evaluate(RouteSpec::public(), "/signup").await;
        assert_eq!(decision, AccessDecision::Allowed);

        // but a constrained route still runs the cascade
        let decision = gate.evaluate(RouteSpec::admin_only(), "/admin").await;
        assert_eq!(decision, AccessDecision::Denied(DenyReason::AdminRequired));
    }

    #[tokio::test]
    async fn test_profile_loading_short_circuits() {
        let gate = gate();
        gate.session().set_profile_loading(true);

        let decision = gate.evaluate(RouteSpec::authenticated(), "/campaigns").await;
        assert_eq!(decision, AccessDecision::Loading);
        // no decision means no audit entry
        assert!(gate.audit().is_empty());
    }

    #[tokio::test]
    async fn test_broken_session_fails_privileged_routes_closed() {
        let gate = gate();
        sign_in(&gate, Profile::new("root").admin()).await;
        gate.session().poison_for_tests();

        let decision = gate.evaluate(RouteSpec::admin_only(), "/admin").await;
        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::SessionUnavailable)
        );

        let decision = gate
            .evaluate(RouteSpec::authenticated().high_security(), "/billing")
            .await;
        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::SessionUnavailable)
        );

        // unconstrained routes keep rendering the anonymous view
        let decision = gate.evaluate(RouteSpec::public(), "/pricing").await;
        assert_eq!(decision, AccessDecision::Allowed);

        // an authenticated route degrades to the login redirect
        let decision = gate.evaluate(RouteSpec::authenticated(), "/campaigns").await;
        assert_eq!(decision.redirect_target(), Some("/login"));

        let events = gate.audit().list();
        let denied: Vec<_> = events
            .iter()
            .filter(|e| e.detail.as_deref() == Some("session_unavailable"))
            .collect();
        assert_eq!(denied.len(), 2);
        assert!(denied.iter().all(|e| e.action == "access_denied"));
    }

    #[tokio::test]
    async fn test_record_event_carries_principal() {
        let gate = gate();
        sign_in(&gate, Profile::new("u1")).await;

        gate.record_event("login", None, true, None).await;

        let events = gate.audit().list();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].principal_id.as_deref(), Some("u1"));
        assert_eq!(events[0].action, "login");
    }
}
