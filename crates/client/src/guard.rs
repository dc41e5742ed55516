//! Route guard: decides whether a page (or command) may run for the current
//! auth state.

use crate::session::AuthSnapshot;

/// Where unauthenticated operators are sent.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
/// Where authenticated operators land when they open a public-only page.
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state not yet known; show a placeholder.
    Loading,
    /// Proceed.
    Render,
    /// Authentication required; go to the login page.
    RedirectToLogin(String),
    /// Page is for anonymous operators only; go to the landing page.
    RedirectToLanding(String),
}

/// Route guard with configurable redirect targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    pub login_path: String,
    pub landing_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
        }
    }
}

impl RouteGuard {
    /// Guard redirecting to the given paths.
    #[must_use]
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    /// Decide for a page that requires (or forbids) authentication.
    #[must_use]
    pub fn decide(&self, snapshot: AuthSnapshot, require_auth: bool) -> GuardDecision {
        if snapshot.is_loading {
            return GuardDecision::Loading;
        }

        match (require_auth, snapshot.is_authenticated) {
            (true, false) => GuardDecision::RedirectToLogin(self.login_path.clone()),
            (false, true) => GuardDecision::RedirectToLanding(self.landing_path.clone()),
            (true, true) | (false, false) => GuardDecision::Render,
        }
    }
}

/// [`RouteGuard::decide`] with the default paths.
#[must_use]
pub fn decide(snapshot: AuthSnapshot, require_auth: bool) -> GuardDecision {
    RouteGuard::default().decide(snapshot, require_auth)
}
