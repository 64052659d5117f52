//! Access decision for one navigation
//!
//! ```text
//! path == root            -> Home
//! no route for path       -> NotFound          (independent of session)
//! path == login path      -> AllowAuthPath     (independent of session)
//! session Checking        -> Checking
//! session absent          -> RequireAuth
//! session present         -> Allow | Deny      (AccessPolicy)
//! ```

use crate::module::security::AccessPolicy;
use crate::router::table::{normalize_path, RouteTable};
use crate::session::SessionPhase;

pub use crate::router::table::RouteEntry;

/// Outcome of evaluating a path against manifest and session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Home,
    Checking,
    AllowAuthPath(RouteEntry),
    RequireAuth { login_path: String },
    Allow(RouteEntry),
    Deny,
    NotFound,
}

impl RouteDecision {
    /// Route entry to load, for decisions that render a module
    pub fn entry(&self) -> Option<&RouteEntry> {
        match self {
            RouteDecision::Allow(entry) | RouteDecision::AllowAuthPath(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Paths with fixed meaning in the shell
#[derive(Debug, Clone)]
pub struct ShellPaths {
    pub root: String,
    pub login: String,
}

impl Default for ShellPaths {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            login: "/auth/login".to_string(),
        }
    }
}

/// Pure decision function
pub fn decide(
    path: &str,
    routes: &RouteTable,
    phase: &SessionPhase,
    policy: &AccessPolicy,
    paths: &ShellPaths,
) -> RouteDecision {
    let path = normalize_path(path);
    if path == normalize_path(&paths.root) {
        return RouteDecision::Home;
    }

    let entry = match routes.lookup(&path) {
        Some(entry) => entry,
        None => return RouteDecision::NotFound,
    };

    if path == normalize_path(&paths.login) {
        return RouteDecision::AllowAuthPath(entry.clone());
    }

    match phase {
        SessionPhase::Checking => RouteDecision::Checking,
        SessionPhase::Unauthenticated => RouteDecision::RequireAuth {
            login_path: paths.login.clone(),
        },
        SessionPhase::Authenticated(session) => {
            if policy.is_allowed(&session.role, &entry.permissions) {
                RouteDecision::Allow(entry.clone())
            } else {
                RouteDecision::Deny
            }
        }
    }
}
