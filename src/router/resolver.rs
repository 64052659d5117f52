//! Access-controlled route resolver
//!
//! Evaluates every navigation afresh: the route table is rebuilt from the
//! current manifest and the decision uses the current session phase. On an
//! allow decision the remote's script is mounted and its factory resolved;
//! any failure there becomes a module-unavailable view for that route only.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::module::container::FactoryResolver;
use crate::module::loader::ScriptLoader;
use crate::module::registry::ManifestStore;
use crate::module::security::AccessPolicy;
use crate::module::traits::{LoadState, ModuleError};
use crate::router::decision::{decide, RouteDecision, RouteEntry, ShellPaths};
use crate::router::table::{normalize_path, RouteTable};
use crate::router::view::{MountedRoute, RouteView, UnavailableReason};
use crate::session::SessionState;

/// Joins manifest and session into per-navigation views
#[derive(Clone)]
pub struct RouteResolver {
    manifest: ManifestStore,
    session: Arc<SessionState>,
    policy: AccessPolicy,
    paths: ShellPaths,
    loader: ScriptLoader,
    factories: FactoryResolver,
}

impl RouteResolver {
    pub fn new(
        manifest: ManifestStore,
        session: Arc<SessionState>,
        policy: AccessPolicy,
        paths: ShellPaths,
        loader: ScriptLoader,
        factories: FactoryResolver,
    ) -> Self {
        Self {
            manifest,
            session,
            policy,
            paths,
            loader,
            factories,
        }
    }

    /// Route table for the current manifest
    pub async fn route_table(&self) -> RouteTable {
        RouteTable::from_manifest(&self.manifest.snapshot().await)
    }

    /// Decide what `path` should show, without loading anything
    pub async fn decide(&self, path: &str) -> RouteDecision {
        let routes = self.route_table().await;
        let decision = decide(
            path,
            &routes,
            &self.session.phase(),
            &self.policy,
            &self.paths,
        );
        debug!("Route decision for {}: {:?}", path, decision);
        decision
    }

    /// Decide and render `path`, loading the remote module when allowed
    pub async fn render(&self, path: &str) -> MountedRoute {
        let decision = self.decide(path).await;
        let path = normalize_path(path);

        let (view, mount) = match &decision {
            RouteDecision::Home => (RouteView::Home, None),
            RouteDecision::Checking => (RouteView::Checking, None),
            RouteDecision::RequireAuth { login_path } => (
                RouteView::AuthenticationRequired {
                    login_path: login_path.clone(),
                },
                None,
            ),
            RouteDecision::Deny => {
                info!("Access denied to {}", path);
                (RouteView::AccessDenied, None)
            }
            RouteDecision::NotFound => (RouteView::NotFound, None),
            RouteDecision::Allow(entry) | RouteDecision::AllowAuthPath(entry) => {
                let mount = self.loader.ensure(&entry.url);
                let view = match mount.wait_settled().await {
                    LoadState::Ready => self.resolve_view(entry).await,
                    _ => RouteView::ModuleUnavailable(UnavailableReason::from(
                        ModuleError::ScriptLoadFailed {
                            url: entry.url.clone(),
                        },
                    )),
                };
                (view, Some(mount))
            }
        };

        MountedRoute {
            path,
            decision,
            view,
            mount,
        }
    }

    async fn resolve_view(&self, entry: &RouteEntry) -> RouteView {
        match self.factories.resolve(&entry.scope, &entry.export_name).await {
            Ok(unit) => RouteView::Module(unit),
            Err(e) => {
                warn!("Route {} unavailable: {}", entry.path, e);
                RouteView::ModuleUnavailable(e.into())
            }
        }
    }
}
