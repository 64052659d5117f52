//! Manifest store
//!
//! Holds scope -> descriptor for the lifetime of the process. Grows from the
//! startup fetch and from runtime registrations; entries are only ever
//! replaced, never removed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::module::registry::manifest::{parse_manifest, ModuleDescriptor};
use crate::module::registry::source::ManifestSource;
use crate::module::traits::ModuleError;
use crate::module::validation::{ManifestValidator, ValidationResult};
use crate::utils::with_fallback_async;

/// Mapping from scope to descriptor
pub type ManifestTable = HashMap<String, ModuleDescriptor>;

/// Shared, cloneable manifest store
#[derive(Clone, Default)]
pub struct ManifestStore {
    table: Arc<RwLock<ManifestTable>>,
}

impl ManifestStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the startup manifest and merge it into the table
    ///
    /// A failed fetch or unparsable document is logged and leaves the table as
    /// it was; an empty table is a valid state. Invalid entries are skipped.
    /// Scopes already registered at runtime keep their registration.
    /// Returns the number of entries added.
    pub async fn load(&self, source: &dyn ManifestSource) -> usize {
        let location = source.location();
        let descriptors = with_fallback_async(
            || async { parse_manifest(&source.fetch().await?) },
            Vec::new,
            &format!("Manifest load from {} failed", location),
        )
        .await;

        let validator = ManifestValidator::new();
        let mut table = self.table.write().await;
        let mut added = 0;

        for descriptor in descriptors {
            if let ValidationResult::Invalid(errors) = validator.validate(&descriptor) {
                warn!("Skipping manifest entry {}: {:?}", descriptor.scope, errors);
                continue;
            }
            if table.contains_key(&descriptor.scope) {
                debug!(
                    "Scope {} already registered at runtime, keeping registration",
                    descriptor.scope
                );
                continue;
            }
            table.insert(descriptor.scope.clone(), descriptor);
            added += 1;
        }

        info!("Loaded {} modules from {}", added, location);
        added
    }

    /// Merge a descriptor, replacing any previous entry for the same scope
    ///
    /// Misaligned or otherwise invalid descriptors are rejected and the table
    /// is left untouched.
    pub async fn register(&self, descriptor: ModuleDescriptor) -> Result<(), ModuleError> {
        ManifestValidator::new()
            .validate(&descriptor)
            .into_result(&descriptor.scope)?;

        let mut table = self.table.write().await;
        let scope = descriptor.scope.clone();
        if table.insert(scope.clone(), descriptor).is_some() {
            info!("Replaced module registration for scope {}", scope);
        } else {
            info!("Registered module scope {}", scope);
        }
        Ok(())
    }

    /// Look up a single scope
    pub async fn get(&self, scope: &str) -> Option<ModuleDescriptor> {
        self.table.read().await.get(scope).cloned()
    }

    /// Copy of the whole table
    pub async fn snapshot(&self) -> ManifestTable {
        self.table.read().await.clone()
    }

    /// Registered scopes, sorted
    pub async fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.table.read().await.keys().cloned().collect();
        scopes.sort();
        scopes
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }
}
