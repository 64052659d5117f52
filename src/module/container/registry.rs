//! Process-wide container registry
//!
//! Remotes publish their container under a self-chosen scope once their entry
//! script has executed. Entries are populated once per remote and never
//! cleared: they outlive the script element and the route that caused the
//! load. Two remotes choosing the same scope overwrite each other; this is
//! logged but cannot be resolved here.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{info, warn};

use crate::module::traits::RemoteContainer;

static GLOBAL: OnceLock<Arc<ContainerRegistry>> = OnceLock::new();

/// Scope -> container map shared by every loader and resolver
#[derive(Default)]
pub struct ContainerRegistry {
    containers: RwLock<HashMap<String, Arc<dyn RemoteContainer>>>,
}

impl ContainerRegistry {
    /// Create an isolated registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process
    pub fn global() -> Arc<ContainerRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ContainerRegistry::new())))
    }

    /// Publish a container under `scope`
    pub fn register(&self, scope: impl Into<String>, container: Arc<dyn RemoteContainer>) {
        let scope = scope.into();
        let mut containers = self
            .containers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if containers.insert(scope.clone(), container).is_some() {
            warn!(
                "Container scope collision: {} was already registered and has been overwritten",
                scope
            );
        } else {
            info!("Container registered for scope {}", scope);
        }
    }

    /// Current container for `scope`, if the remote has registered
    pub fn lookup(&self, scope: &str) -> Option<Arc<dyn RemoteContainer>> {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scope)
            .cloned()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(scope)
    }

    /// Registered scopes, sorted
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self
            .containers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        scopes.sort();
        scopes
    }
}
