//! Access decisions.

/// Why a navigation intent was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The route is admin-only and the profile is not an administrator.
    AdminRequired,
    /// The elevated-activity heuristic tripped on a high-security route.
    ElevatedActivity,
    /// The route-access budget for the current window is exhausted.
    RateLimited,
    /// The session can no longer attest anything about the visitor;
    /// protected routes fail toward the least powerful state.
    SessionUnavailable,
}

impl DenyReason {
    /// Stable machine-readable reason string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::AdminRequired => "admin_required",
            DenyReason::ElevatedActivity => "elevated_activity",
            DenyReason::RateLimited => "rate_limited",
            DenyReason::SessionUnavailable => "session_unavailable",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one navigation intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the requested route.
    Allowed,
    /// Navigate to `target` instead; `from` carries the originally
    /// requested path so the login flow can return the user afterward.
    Redirected {
        target: String,
        from: Option<String>,
    },
    /// Refuse with a machine-readable reason.
    Denied(DenyReason),
    /// The upstream profile fetch has not resolved; render a neutral
    /// placeholder and re-evaluate once it clears.
    Loading,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Redirect target, if this decision is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirected { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_reason_strings() {
        assert_eq!(DenyReason::AdminRequired.as_str(), "admin_required");
        assert_eq!(DenyReason::ElevatedActivity.as_str(), "elevated_activity");
        assert_eq!(DenyReason::RateLimited.as_str(), "rate_limited");
        assert_eq!(
            DenyReason::SessionUnavailable.as_str(),
            "session_unavailable"
        );
    }

    #[test]
    fn test_decision_accessors() {
        assert!(AccessDecision::Allowed.is_allowed());
        assert!(AccessDecision::Loading.is_loading());

        let redirect = AccessDecision::Redirected {
            target: "/login".to_owned(),
            from: Some("/campaigns".to_owned()),
        };
        assert_eq!(redirect.redirect_target(), Some("/login"));
        assert_eq!(AccessDecision::Allowed.redirect_target(), None);
    }
}
