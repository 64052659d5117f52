//! Test fixtures for the host shell: an in-process script host, containers
//! and a manifest source.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use remote_shell::module::api::{LoginMessage, RegisterMessage, ShellMessage};
use remote_shell::module::container::{ContainerRegistry, SharedScope};
use remote_shell::module::registry::ManifestSource;
use remote_shell::module::traits::{
    ModuleError, ModuleFactory, RemoteContainer, Renderable, ScriptElementId, ScriptHost,
    ScriptLoadResult,
};
use remote_shell::session::{HistoryNavigator, MemorySessionStorage, SessionStorage};
use remote_shell::{HostShell, Platform, ShellConfig};

pub const BOOKING_MANIFEST: &str = r#"{
    "booking": {
        "url": "https://x/remoteEntry.js",
        "components": ["List"],
        "routes": ["/booking/list"],
        "permissions": ["member", "admin"]
    },
    "auth": {
        "url": "https://auth/remoteEntry.js",
        "components": ["Login", "Profile"],
        "routes": ["/auth/login", "/auth/profile"],
        "permissions": []
    }
}"#;

/// Renderable that just echoes a label
pub struct TestUnit(pub String);

impl Renderable for TestUnit {
    fn render(&self) -> String {
        format!("<section>{}</section>", self.0)
    }
}

/// Container exposing a fixed set of exports
#[derive(Default)]
pub struct TestContainer {
    exports: HashMap<String, String>,
    pub inits: AtomicUsize,
}

impl TestContainer {
    pub fn with_exports(exports: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            exports: exports
                .iter()
                .map(|(name, label)| (name.to_string(), label.to_string()))
                .collect(),
            inits: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RemoteContainer for TestContainer {
    async fn init(&self, shared: &SharedScope) -> anyhow::Result<()> {
        anyhow::ensure!(shared.is_initialized(), "shared scope not initialized");
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, export_name: &str) -> anyhow::Result<ModuleFactory> {
        let label = self
            .exports
            .get(export_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Module \"{}\" does not exist in container", export_name))?;
        Ok(ModuleFactory::new(move || {
            Ok(Arc::new(TestUnit(label)) as Arc<dyn Renderable>)
        }))
    }
}

/// What the fake platform does when a script for a URL is attached
#[derive(Clone)]
pub enum ScriptBehavior {
    /// Load succeeds; the script registers `container` under `scope` after `register_after`
    Load {
        scope: String,
        container: Arc<dyn RemoteContainer>,
        register_after: Duration,
    },
    /// Load succeeds but the script never registers anything
    LoadWithoutContainer,
    /// Network error / 404
    Fail,
}

/// In-process stand-in for the document the scripts are attached to
pub struct FakeScriptHost {
    registry: Arc<ContainerRegistry>,
    behaviors: Mutex<HashMap<String, ScriptBehavior>>,
    load_latency: Duration,
    pub attached: AtomicUsize,
    pub detached: AtomicUsize,
}

impl FakeScriptHost {
    pub fn new(registry: Arc<ContainerRegistry>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            behaviors: Mutex::new(HashMap::new()),
            load_latency: Duration::from_millis(20),
            attached: AtomicUsize::new(0),
            detached: AtomicUsize::new(0),
        })
    }

    pub fn on(&self, url: &str, behavior: ScriptBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(url.to_string(), behavior);
    }

    pub fn serve(&self, url: &str, scope: &str, container: Arc<dyn RemoteContainer>) {
        self.on(
            url,
            ScriptBehavior::Load {
                scope: scope.to_string(),
                container,
                register_after: Duration::ZERO,
            },
        );
    }

    pub fn live_elements(&self) -> usize {
        self.attached.load(Ordering::SeqCst) - self.detached.load(Ordering::SeqCst)
    }
}

impl ScriptHost for FakeScriptHost {
    fn attach(&self, _id: ScriptElementId, url: &str) -> oneshot::Receiver<ScriptLoadResult> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        let behavior = self.behaviors.lock().unwrap().get(url).cloned();
        let registry = Arc::clone(&self.registry);
        let latency = self.load_latency;
        let url = url.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            match behavior {
                Some(ScriptBehavior::Load {
                    scope,
                    container,
                    register_after,
                }) => {
                    let _ = tx.send(Ok(()));
                    tokio::time::sleep(register_after).await;
                    registry.register(scope, container);
                }
                Some(ScriptBehavior::LoadWithoutContainer) => {
                    let _ = tx.send(Ok(()));
                }
                Some(ScriptBehavior::Fail) | None => {
                    let _ = tx.send(Err(format!("GET {} failed: 404", url)));
                }
            }
        });
        rx
    }

    fn detach(&self, _id: ScriptElementId) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

/// Manifest held in memory
pub struct InlineManifest(pub Option<String>);

#[async_trait]
impl ManifestSource for InlineManifest {
    fn location(&self) -> String {
        "inline".to_string()
    }

    async fn fetch(&self) -> Result<String, ModuleError> {
        self.0
            .clone()
            .ok_or_else(|| ModuleError::FetchError("GET /config.json: 404".to_string()))
    }
}

/// A shell wired to fakes, with handles to inspect them
pub struct ShellFixture {
    pub shell: HostShell,
    pub host: Arc<FakeScriptHost>,
    pub registry: Arc<ContainerRegistry>,
    pub storage: Arc<dyn SessionStorage>,
    pub navigator: Arc<HistoryNavigator>,
}

impl ShellFixture {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemorySessionStorage::new()))
    }

    pub fn with_storage(storage: Arc<dyn SessionStorage>) -> Self {
        let registry = Arc::new(ContainerRegistry::new());
        let host = FakeScriptHost::new(Arc::clone(&registry));
        let navigator = Arc::new(HistoryNavigator::default());
        let platform = Platform {
            script_host: host.clone(),
            storage: Arc::clone(&storage),
            navigator: navigator.clone(),
            containers: Arc::clone(&registry),
        };
        Self {
            shell: HostShell::new(ShellConfig::default(), platform),
            host,
            registry,
            storage,
            navigator,
        }
    }

    /// Start with the booking manifest
    pub async fn start(&mut self) -> usize {
        self.shell
            .start(&InlineManifest(Some(BOOKING_MANIFEST.to_string())))
            .await
    }

    /// Serve the booking remote with a working container
    pub fn serve_booking(&self) -> Arc<TestContainer> {
        let container = TestContainer::with_exports(&[("./List", "booking list")]);
        self.host
            .serve("https://x/remoteEntry.js", "booking", container.clone());
        container
    }

    /// Log in through the bus and wait until the shell has applied it
    pub async fn login(&self, username: &str, role: &str) {
        self.shell.dispatch(login_message(username, role)).await;
    }
}

pub fn login_message(username: &str, role: &str) -> ShellMessage {
    ShellMessage::Login(LoginMessage {
        username: username.to_string(),
        role: role.to_string(),
    })
}

pub fn register_message(name: &str, url: &str, component: &str, route: &str) -> ShellMessage {
    ShellMessage::Register(RegisterMessage {
        name: name.to_string(),
        url: url.to_string(),
        components: vec![component.to_string()],
        routes: vec![route.to_string()],
        permissions: vec![],
    })
}
