//! Route classification.

/// The ad-hoc boolean bag the routing collaborator attaches to a route.
///
/// This is the external wire shape; internally the gate works on the
/// exhaustive [`RouteClass`] derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteSpec {
    pub requires_auth: bool,
    pub admin_only: bool,
    pub high_security: bool,
}

impl RouteSpec {
    /// A route with no constraints.
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }

    pub fn admin_only() -> Self {
        Self {
            requires_auth: true,
            admin_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn high_security(mut self) -> Self {
        self.high_security = true;
        self
    }
}

/// Elevated base requirement of a high-security route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevated {
    Authenticated,
    AdminOnly,
}

/// Exhaustive route classification.
///
/// Replaces if/else fallthrough over the boolean bag with a tagged
/// variant, so the rule ordering is checked by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No constraints; authenticated visitors are bounced to the
    /// dashboard unless the path is on the public allowlist.
    Public,
    /// Requires a loaded profile.
    Authenticated,
    /// Requires an administrator profile (implies authenticated).
    AdminOnly,
    /// Additionally subject to the elevated-activity heuristic.
    HighSecurity(Elevated),
}

impl From<RouteSpec> for RouteClass {
    fn from(spec: RouteSpec) -> Self {
        let base = if spec.admin_only {
            Elevated::AdminOnly
        } else {
            Elevated::Authenticated
        };

        if spec.high_security {
            RouteClass::HighSecurity(base)
        } else if spec.admin_only {
            RouteClass::AdminOnly
        } else if spec.requires_auth {
            RouteClass::Authenticated
        } else {
            RouteClass::Public
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_flags() {
        assert_eq!(RouteClass::from(RouteSpec::public()), RouteClass::Public);
        assert_eq!(
            RouteClass::from(RouteSpec::authenticated()),
            RouteClass::Authenticated
        );
        assert_eq!(
            RouteClass::from(RouteSpec::admin_only()),
            RouteClass::AdminOnly
        );
        assert_eq!(
            RouteClass::from(RouteSpec::authenticated().high_security()),
            RouteClass::HighSecurity(Elevated::Authenticated)
        );
        assert_eq!(
            RouteClass::from(RouteSpec::admin_only().high_security()),
            RouteClass::HighSecurity(Elevated::AdminOnly)
        );
    }

    #[test]
    fn test_admin_flag_wins_over_plain_auth() {
        let spec = RouteSpec {
            requires_auth: false,
            admin_only: true,
            high_security: false,
        };
        assert_eq!(RouteClass::from(spec), RouteClass::AdminOnly);
    }
}
