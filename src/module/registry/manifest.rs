//! Module manifest parsing
//!
//! The manifest is a single JSON document keyed by scope:
//!
//! ```json
//! { "booking": { "url": "https://x/remoteEntry.js",
//!                "components": ["List"],
//!                "routes": ["/booking/list"],
//!                "permissions": ["member", "admin"] } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::module::traits::ModuleError;

/// One manifest value as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Remote entry script location
    pub url: String,
    /// Exposed component names, index-aligned with `routes`
    #[serde(default)]
    pub components: Vec<String>,
    /// Route paths, index-aligned with `components`
    #[serde(default)]
    pub routes: Vec<String>,
    /// Roles allowed to open the routes (empty = everyone signed in)
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Whole manifest document
pub type ManifestDocument = BTreeMap<String, ManifestEntry>;

/// Everything the shell knows about one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique key; also the name the container registers under
    pub scope: String,
    /// Remote entry script URL
    pub remote_entry_url: String,
    /// Exposed component names, index-aligned with `route_paths`
    pub exposed_components: Vec<String>,
    /// Route paths, index-aligned with `exposed_components`
    pub route_paths: Vec<String>,
    /// Roles allowed to open this module's routes
    pub required_permissions: BTreeSet<String>,
}

impl ModuleDescriptor {
    /// Build a descriptor from a manifest entry
    pub fn from_entry(scope: impl Into<String>, entry: ManifestEntry) -> Self {
        Self {
            scope: scope.into(),
            remote_entry_url: entry.url,
            exposed_components: entry.components,
            route_paths: entry.routes,
            required_permissions: entry.permissions.into_iter().collect(),
        }
    }

    /// Components and routes have the same length
    pub fn is_aligned(&self) -> bool {
        self.exposed_components.len() == self.route_paths.len()
    }

    /// (route path, export name) pairs
    ///
    /// Zips the two sequences, so a misaligned descriptor never indexes out of
    /// bounds; callers still reject misaligned descriptors before storing them.
    pub fn routes(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.route_paths
            .iter()
            .zip(self.exposed_components.iter())
            .map(|(path, component)| (path.as_str(), export_name(component)))
    }
}

/// Export name the container expects for a component (`List` -> `./List`)
pub fn export_name(component: &str) -> String {
    if component.starts_with("./") {
        component.to_string()
    } else {
        format!("./{}", component)
    }
}

/// Parse a manifest document into descriptors (unvalidated)
pub fn parse_manifest(text: &str) -> Result<Vec<ModuleDescriptor>, ModuleError> {
    let document: ManifestDocument = serde_json::from_str(text)
        .map_err(|e| ModuleError::FetchError(format!("Failed to parse manifest JSON: {}", e)))?;

    Ok(document
        .into_iter()
        .map(|(scope, entry)| ModuleDescriptor::from_entry(scope, entry))
        .collect())
}
