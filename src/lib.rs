//! Remote Shell - runtime composition of independently deployed UI modules
//!
//! The shell loads remote modules ("remotes") at runtime from a declarative
//! manifest and decides per navigation whether the current user's role may
//! see each one.
//!
//! ## Components (leaves first)
//!
//! 1. **Manifest Store** (`module::registry`): scope -> remote entry, components, routes, permissions
//! 2. **Session State** (`session`): login/logout/restore, persisted across reloads
//! 3. **Remote Script Loader** (`module::loader`): one script element per mount, settle delay
//! 4. **Container Discovery & Factory Resolver** (`module::container`): bounded poll, shared handshake
//! 5. **Route Resolver** (`router`): render / redirect / deny for each navigation
//!
//! ## Design Principles
//!
//! 1. **Failure isolation**: a failing remote only affects its own route
//! 2. **Platform seams**: script attachment, durable storage and navigation are traits
//! 3. **Always fresh**: decisions and resolutions are recomputed on every navigation

pub mod config;
pub mod module;
pub mod router;
pub mod session;
pub mod utils;

pub use config::ShellConfig;

use std::sync::Arc;
use tracing::{info, warn};

use crate::module::container::{ContainerRegistry, FactoryResolver, SharedScope};
use crate::module::loader::ScriptLoader;
use crate::module::registry::{source_for_location, ManifestSource, ManifestStore};
use crate::module::security::AccessPolicy;
use crate::module::traits::ScriptHost;
use crate::module::api::{MessageQueue, PumpHandle};
use crate::module::{MessageBus, MessagePump, ShellMessage};
use crate::router::{MountedRoute, RouteDecision, RouteResolver, ShellPaths};
use crate::session::{Navigator, SessionPhase, SessionState, SessionStorage};

/// Name of the host's shared-dependency scope
pub const DEFAULT_SHARE_SCOPE: &str = "default";

/// Platform services the shell runs on
#[derive(Clone)]
pub struct Platform {
    pub script_host: Arc<dyn ScriptHost>,
    pub storage: Arc<dyn SessionStorage>,
    pub navigator: Arc<dyn Navigator>,
    /// Where remotes publish their containers
    pub containers: Arc<ContainerRegistry>,
}

impl Platform {
    /// Platform using the process-wide container registry
    pub fn new(
        script_host: Arc<dyn ScriptHost>,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            script_host,
            storage,
            navigator,
            containers: ContainerRegistry::global(),
        }
    }
}

/// Main host shell
pub struct HostShell {
    config: ShellConfig,
    manifest: ManifestStore,
    session: Arc<SessionState>,
    bus: MessageBus,
    queue: Option<MessageQueue>,
    resolver: RouteResolver,
    pump: Option<PumpHandle>,
}

impl HostShell {
    /// Wire up a shell; nothing runs until [`HostShell::start`]
    pub fn new(config: ShellConfig, platform: Platform) -> Self {
        let manifest = ManifestStore::new();
        let session = Arc::new(SessionState::new(
            platform.storage,
            platform.navigator,
            config.session_key.clone(),
            config.root_path.clone(),
        ));
        let shared = Arc::new(SharedScope::new(DEFAULT_SHARE_SCOPE, config.shared.clone()));
        let factories = FactoryResolver::new(platform.containers, shared, config.poll_policy());
        let loader = ScriptLoader::new(platform.script_host, config.settle_delay());
        let resolver = RouteResolver::new(
            manifest.clone(),
            Arc::clone(&session),
            AccessPolicy::new(config.admin_role.clone()),
            ShellPaths {
                root: config.root_path.clone(),
                login: config.login_path.clone(),
            },
            loader,
            factories,
        );

        let (bus, queue) = MessageBus::new(config.bus_capacity);

        Self {
            bus,
            queue: Some(queue),
            config,
            manifest,
            session,
            resolver,
            pump: None,
        }
    }

    /// Restore the session, start consuming the bus and load the manifest
    ///
    /// Returns the number of modules taken from the manifest document. A
    /// missing manifest is not an error; remotes can still register later.
    pub async fn start(&mut self, source: &dyn ManifestSource) -> usize {
        let phase = self.session.restore();
        info!(
            "Session restored: {}",
            match phase {
                SessionPhase::Authenticated(_) => "authenticated",
                _ => "signed out",
            }
        );

        if let Some(queue) = self.queue.take() {
            let pump = MessagePump::new(Arc::clone(&self.session), self.manifest.clone());
            self.pump = Some(pump.spawn(queue));
        }

        self.manifest.load(source).await
    }

    /// [`HostShell::start`] with the manifest location from config
    pub async fn start_from_config(&mut self) -> usize {
        let source = source_for_location(&self.config.manifest_location);
        self.start(source.as_ref()).await
    }

    /// Decide only
    ///
    /// Every message published before the call is applied first.
    pub async fn decide(&self, path: &str) -> RouteDecision {
        self.catch_up().await;
        self.resolver.decide(path).await
    }

    /// Render `path`; the returned route keeps its script attached until dropped
    ///
    /// Every message published before the call is applied first.
    pub async fn navigate(&self, path: &str) -> MountedRoute {
        self.catch_up().await;
        self.resolver.render(path).await
    }

    /// Publish `message` and wait until the shell has applied it
    ///
    /// Before [`HostShell::start`] the message stays queued and this returns
    /// straight away.
    pub async fn dispatch(&self, message: ShellMessage) {
        self.bus.publish(message);
        self.catch_up().await;
    }

    /// Wait for the pump to apply everything published so far
    async fn catch_up(&self) {
        if let Some(pump) = &self.pump {
            let published = self.bus.published();
            if !pump.wait_applied(published).await {
                warn!("Message pump stopped with {} messages published", published);
            }
        }
    }

    /// Stop consuming the bus
    pub fn shutdown(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Bus for publishing login, logout and registration messages
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }
}

impl Drop for HostShell {
    fn drop(&mut self) {
        self.shutdown();
    }
}
