//! Configuration types for the gatehouse library.
//!
//! Every threshold the gate relies on lives here rather than being
//! hard-coded: the per-minute action ceiling, loop detection thresholds,
//! the audit trail cap, the debounce window and the route policy.
//!
//! # Example
//!
//! ```rust
//! use gatehouse::config::{GateConfig, RateLimitConfig};
//!
//! // Use defaults
//! let config = GateConfig::default();
//!
//! // Or customize
//! let config = GateConfig {
//!     rate_limit: RateLimitConfig {
//!         max_per_window: 50,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

/// Main configuration struct for the gatehouse library.
///
/// Use `GateConfig::default()` for the thresholds the production client
/// ships with.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Fixed-window rate limiting settings.
    pub rate_limit: RateLimitConfig,

    /// Navigation loop detection settings.
    pub loop_detection: LoopConfig,

    /// High-security route heuristic bounds.
    pub high_security: HighSecurityConfig,

    /// Coalescing of rapid repeated navigation intents.
    pub debounce: DebounceConfig,

    /// Route policy: redirect targets, error pages, public allowlist.
    pub routes: RoutePolicy,

    /// Maximum number of retained audit events.
    ///
    /// Default: 1,000. Oldest entries are evicted first.
    pub audit_capacity: usize,

    /// Operational escape hatch: unconstrained routes skip evaluation
    /// entirely when set. Never enabled in a hardened build.
    pub developer_bypass: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            loop_detection: LoopConfig::default(),
            high_security: HighSecurityConfig::default(),
            debounce: DebounceConfig::default(),
            routes: RoutePolicy::default(),
            audit_capacity: 1_000,
            developer_bypass: false,
        }
    }
}

impl GateConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for development.
    ///
    /// Looser rate ceiling, bypass enabled for unconstrained routes.
    pub fn development() -> Self {
        Self {
            rate_limit: RateLimitConfig {
                max_per_window: 1_000,
                ..Default::default()
            },
            developer_bypass: true,
            ..Default::default()
        }
    }

    /// Creates a configuration with stricter thresholds.
    pub fn strict() -> Self {
        Self {
            rate_limit: RateLimitConfig {
                max_per_window: 30,
                ..Default::default()
            },
            loop_detection: LoopConfig {
                loop_threshold: 3,
                severe_threshold: 6,
                ..Default::default()
            },
            high_security: HighSecurityConfig {
                max_requests: 50,
                max_errors: 3,
            },
            ..Default::default()
        }
    }
}

/// Configuration for the fixed-window action rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum actions per window per action name.
    ///
    /// Default: 100
    pub max_per_window: u32,

    /// Width of the fixed window.
    ///
    /// Default: 1 minute
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: 100,
            window: Duration::minutes(1),
        }
    }
}

impl RateLimitConfig {
    /// Returns the window width in whole seconds.
    #[inline]
    pub fn window_secs(&self) -> i64 {
        self.window.num_seconds().max(1)
    }
}

/// Configuration for navigation loop detection.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Number of recent paths retained (FIFO).
    ///
    /// Default: 10
    pub history_capacity: usize,

    /// Occurrences within the history that classify as a loop.
    ///
    /// Default: 5
    pub loop_threshold: u32,

    /// Occurrences within the history that classify as a severe loop.
    ///
    /// Default: 10
    pub severe_threshold: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10,
            loop_threshold: 5,
            severe_threshold: 10,
        }
    }
}

/// Bounds for the elevated-activity heuristic on high-security routes.
#[derive(Debug, Clone)]
pub struct HighSecurityConfig {
    /// Cumulative in-process limiter requests above which access is denied.
    ///
    /// Default: 100
    pub max_requests: u64,

    /// Cumulative storage errors above which access is denied.
    ///
    /// Default: 10
    pub max_errors: u64,
}

impl Default for HighSecurityConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            max_errors: 10,
        }
    }
}

/// Coalescing window for rapid repeated navigation intents.
///
/// Consecutive intents for the same path inside the window reuse the
/// previous rate-limit verdict instead of consuming budget again.
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    /// Default: 100 milliseconds
    pub coalesce_window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            coalesce_window: Duration::milliseconds(100),
        }
    }
}

/// Route policy: where redirects land and which paths are special-cased.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Redirect target for unauthenticated visitors. Default: `/login`
    pub login_path: String,

    /// Redirect target for loop breaking and guest-only routes.
    /// Default: `/dashboard`
    pub default_path: String,

    /// Error pages. Reloading these never escalates to a severe loop, and
    /// an unauthenticated visit renders them instead of redirecting.
    pub error_pages: Vec<String>,

    /// Public pages an authenticated user may still visit even when the
    /// route is flagged guest-only.
    pub public_pages: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            login_path: "/login".to_owned(),
            default_path: "/dashboard".to_owned(),
            error_pages: vec![
                "/404".to_owned(),
                "/not-found".to_owned(),
                "/401".to_owned(),
                "/unauthorized".to_owned(),
                "/403".to_owned(),
                "/forbidden".to_owned(),
                "/maintenance".to_owned(),
            ],
            public_pages: vec![
                "/contact".to_owned(),
                "/pricing".to_owned(),
                "/status".to_owned(),
            ],
        }
    }
}

impl RoutePolicy {
    /// Returns true if `path` is on the error-page denylist.
    pub fn is_error_page(&self, path: &str) -> bool {
        self.error_pages.iter().any(|p| p == path)
    }

    /// Returns true if `path` is on the public allowlist.
    ///
    /// Error pages are implicitly public.
    pub fn is_public_page(&self, path: &str) -> bool {
        self.public_pages.iter().any(|p| p == path) || self.is_error_page(path)
    }
}
