//! What a route renders

use std::sync::Arc;

use crate::module::loader::ScriptMount;
use crate::module::traits::{ModuleError, Renderable};
use crate::router::decision::RouteDecision;

/// Why a module route could not be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Remote entry script failed to load
    ScriptFailed { url: String },
    /// Script loaded but the container never appeared
    ContainerMissing { scope: String, attempts: u32 },
    /// Container found but init/get/factory failed
    ResolutionFailed { scope: String, reason: String },
}

impl From<ModuleError> for UnavailableReason {
    fn from(error: ModuleError) -> Self {
        match error {
            ModuleError::ScriptLoadFailed { url } => UnavailableReason::ScriptFailed { url },
            ModuleError::ContainerNotFound { scope, attempts } => {
                UnavailableReason::ContainerMissing { scope, attempts }
            }
            ModuleError::ModuleResolution { scope, reason, .. } => {
                UnavailableReason::ResolutionFailed { scope, reason }
            }
            other => UnavailableReason::ResolutionFailed {
                scope: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// Rendered state of a route
#[derive(Debug, Clone)]
pub enum RouteView {
    Home,
    Checking,
    AuthenticationRequired { login_path: String },
    AccessDenied,
    NotFound,
    Module(Arc<dyn Renderable>),
    ModuleUnavailable(UnavailableReason),
}

impl RouteView {
    /// Fixed markup for the shell views; the module's own output otherwise
    pub fn to_markup(&self) -> String {
        match self {
            RouteView::Home => "<div>Welcome to Host App</div>".to_string(),
            RouteView::Checking => "<div>Checking session...</div>".to_string(),
            RouteView::AuthenticationRequired { login_path } => format!(
                "<div>Authentication required. <a href=\"{}\">Log in</a></div>",
                login_path
            ),
            RouteView::AccessDenied => "<div>Access Denied</div>".to_string(),
            RouteView::NotFound => "<div>404 - Module Not Found</div>".to_string(),
            RouteView::Module(unit) => unit.render(),
            RouteView::ModuleUnavailable(UnavailableReason::ScriptFailed { .. }) => {
                "<div>Module unavailable. Load failed.</div>".to_string()
            }
            RouteView::ModuleUnavailable(UnavailableReason::ContainerMissing {
                scope,
                attempts,
            }) => format!(
                "<div>Module unavailable. Container {} not found after {} attempts.</div>",
                scope, attempts
            ),
            RouteView::ModuleUnavailable(UnavailableReason::ResolutionFailed { reason, .. }) => {
                format!("<div>Error loading module: {}</div>", reason)
            }
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, RouteView::Module(_))
    }
}

/// A rendered route, holding its script mount for as long as it is shown
///
/// Dropping it (or calling [`MountedRoute::unmount`]) detaches the script.
pub struct MountedRoute {
    pub(crate) path: String,
    pub(crate) decision: RouteDecision,
    pub(crate) view: RouteView,
    pub(crate) mount: Option<ScriptMount>,
}

impl MountedRoute {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn decision(&self) -> &RouteDecision {
        &self.decision
    }

    pub fn view(&self) -> &RouteView {
        &self.view
    }

    pub fn markup(&self) -> String {
        self.view.to_markup()
    }

    /// Script mount backing this route, if it is a module route
    pub fn mount(&self) -> Option<&ScriptMount> {
        self.mount.as_ref()
    }

    /// Leave the route, detaching its script
    pub fn unmount(mut self) {
        if let Some(mut mount) = self.mount.take() {
            mount.unmount();
        }
    }
}
