//! Shared-dependency scope
//!
//! Host and remotes agree on single instances of shared libraries before any
//! remote initializes. The host seeds the scope from config during a one-time
//! handshake; containers may add their own entries from `init`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::SharedDependencyConfig;

/// Provider name the host uses for its own entries
pub const HOST_PROVIDER: &str = "host";

/// One entry in the shared scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDependency {
    pub version: String,
    pub singleton: bool,
    pub eager: bool,
    pub required_version: Option<String>,
    /// Who provided this entry (`host` or a scope)
    pub provider: String,
}

impl SharedDependency {
    fn from_config(config: &SharedDependencyConfig) -> Self {
        Self {
            version: config.version.clone(),
            singleton: config.singleton,
            eager: config.eager,
            required_version: config.required_version.clone(),
            provider: HOST_PROVIDER.to_string(),
        }
    }
}

/// Named shared scope (the host uses `default`)
pub struct SharedScope {
    name: String,
    host_dependencies: HashMap<String, SharedDependencyConfig>,
    entries: RwLock<HashMap<String, SharedDependency>>,
    handshake: OnceCell<()>,
    handshake_runs: AtomicUsize,
}

impl SharedScope {
    /// Create a scope the host will seed with `host_dependencies`
    pub fn new(
        name: impl Into<String>,
        host_dependencies: HashMap<String, SharedDependencyConfig>,
    ) -> Self {
        Self {
            name: name.into(),
            host_dependencies,
            entries: RwLock::new(HashMap::new()),
            handshake: OnceCell::new(),
            handshake_runs: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the sharing handshake
    ///
    /// Idempotent: the first caller performs it, concurrent callers wait for
    /// that same run, later callers return immediately.
    pub async fn initialize(&self) {
        self.handshake
            .get_or_init(|| async {
                self.handshake_runs.fetch_add(1, Ordering::SeqCst);
                for (name, config) in &self.host_dependencies {
                    self.provide(name.clone(), SharedDependency::from_config(config));
                }
                info!(
                    "Shared scope {} initialized with {} host dependencies",
                    self.name,
                    self.host_dependencies.len()
                );
            })
            .await;
    }

    /// Handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.handshake.initialized()
    }

    /// Number of times the handshake body actually ran (0 or 1)
    pub fn handshake_runs(&self) -> usize {
        self.handshake_runs.load(Ordering::SeqCst)
    }

    /// Offer a dependency; returns false if an existing singleton was kept
    pub fn provide(&self, name: impl Into<String>, dependency: SharedDependency) -> bool {
        let name = name.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&name) {
            if existing.singleton {
                debug!(
                    "Shared singleton {} already provided by {}, ignoring {}",
                    name, existing.provider, dependency.provider
                );
                return false;
            }
        }
        entries.insert(name, dependency);
        true
    }

    pub fn get(&self, name: &str) -> Option<SharedDependency> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of all shared entries, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
