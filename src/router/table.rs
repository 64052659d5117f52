//! Route table
//!
//! Flattens the manifest into one entry per navigable path. Rebuilt from the
//! current manifest on every decision, so runtime registrations are routable
//! on the next navigation.

use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::module::registry::ManifestTable;

/// Everything needed to serve one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub scope: String,
    /// Export requested from the container (`./List`)
    pub export_name: String,
    pub url: String,
    pub permissions: BTreeSet<String>,
}

/// Path -> entry
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteEntry>,
}

impl RouteTable {
    /// Build from a manifest snapshot
    ///
    /// Misaligned descriptors contribute no routes. When two scopes claim the
    /// same path, the scope sorting last wins.
    pub fn from_manifest(manifest: &ManifestTable) -> Self {
        let mut scopes: Vec<&String> = manifest.keys().collect();
        scopes.sort();

        let mut routes = HashMap::new();
        for scope in scopes {
            let descriptor = &manifest[scope];
            if !descriptor.is_aligned() {
                warn!("Ignoring routes of misaligned module {}", scope);
                continue;
            }
            for (path, export_name) in descriptor.routes() {
                let path = normalize_path(path);
                let entry = RouteEntry {
                    path: path.clone(),
                    scope: descriptor.scope.clone(),
                    export_name,
                    url: descriptor.remote_entry_url.clone(),
                    permissions: descriptor.required_permissions.clone(),
                };
                if let Some(previous) = routes.insert(path.clone(), entry) {
                    warn!(
                        "Route {} claimed by both {} and {}; using {}",
                        path, previous.scope, scope, scope
                    );
                }
            }
        }

        Self { routes }
    }

    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(&normalize_path(path))
    }

    /// All entries, sorted by path
    pub fn entries(&self) -> Vec<&RouteEntry> {
        let mut entries: Vec<&RouteEntry> = self.routes.values().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Drop query, fragment and trailing slashes (root stays `/`)
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
