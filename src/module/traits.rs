//! Module system traits and interfaces
//!
//! Defines the contract remotes implement once their entry script has run,
//! the platform seam for attaching scripts, and the error taxonomy shared by
//! the loading pipeline.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::module::container::SharedScope;

/// Load state of one mounted remote entry script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Nothing has been attached yet
    NotRequested,
    /// Script attached, waiting for load signal and settle delay
    Loading,
    /// Script loaded and settle delay elapsed
    Ready,
    /// Script failed to load (terminal for this mount)
    Failed,
}

impl LoadState {
    /// Ready or Failed; no further transitions happen
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed)
    }
}

/// A unit produced by a remote factory, ready to be placed in the shell
pub trait Renderable: Send + Sync {
    /// Render the unit to markup
    fn render(&self) -> String;
}

impl fmt::Debug for dyn Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderable").finish_non_exhaustive()
    }
}

/// Callable obtained from a container; invoking it yields the renderable unit
///
/// Invocation is awaited, so a remote may fetch whatever it needs before
/// producing the unit.
pub struct ModuleFactory {
    inner: Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<Arc<dyn Renderable>>> + Send>,
}

impl ModuleFactory {
    /// Factory that builds its unit synchronously
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn Renderable>> + Send + 'static,
    {
        Self::from_async(move || async move { f() })
    }

    /// Factory whose unit is produced by a future
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Arc<dyn Renderable>>> + Send + 'static,
    {
        Self {
            inner: Box::new(move || f().boxed()),
        }
    }

    /// Invoke the factory
    ///
    /// The closure runs on first poll, so a panic in it surfaces through the
    /// returned future.
    pub async fn invoke(self) -> anyhow::Result<Arc<dyn Renderable>> {
        (self.inner)().await
    }
}

impl fmt::Debug for ModuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ModuleFactory")
    }
}

/// Object a remote publishes under its scope once its entry script executed
///
/// Errors are the remote's own; the resolver turns them into
/// [`ModuleError::ModuleResolution`].
#[async_trait]
pub trait RemoteContainer: Send + Sync {
    /// Negotiate shared dependencies with the host
    async fn init(&self, shared: &SharedScope) -> anyhow::Result<()>;

    /// Look up an exposed module (e.g. `./List`)
    async fn get(&self, export_name: &str) -> anyhow::Result<ModuleFactory>;
}

/// Identity of one attached script element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptElementId(Uuid);

impl ScriptElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScriptElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScriptElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script-{}", self.0)
    }
}

/// Outcome reported by the platform for an attached script
pub type ScriptLoadResult = Result<(), String>;

/// Platform seam: the document the shell attaches remote entry scripts to
///
/// `attach` starts the fetch and returns the completion signal. The fetch
/// belongs to the platform: `detach` removes the element but does not cancel
/// the download, and whatever the script registers stays registered.
pub trait ScriptHost: Send + Sync {
    /// Attach a script element for `url`
    fn attach(&self, id: ScriptElementId, url: &str) -> oneshot::Receiver<ScriptLoadResult>;

    /// Remove a previously attached element
    fn detach(&self, id: ScriptElementId);
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Manifest fetch failed: {0}")]
    FetchError(String),

    #[error("Invalid module manifest: {0}")]
    InvalidManifest(String),

    #[error("Persisted session is corrupt: {0}")]
    PersistedStateCorrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote entry script failed to load: {url}")]
    ScriptLoadFailed { url: String },

    #[error("Container for scope \"{scope}\" not found after {attempts} attempts")]
    ContainerNotFound { scope: String, attempts: u32 },

    #[error("Failed to resolve {export} from {scope}: {reason}")]
    ModuleResolution {
        scope: String,
        export: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ModuleError {
    fn from(e: serde_json::Error) -> Self {
        ModuleError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for ModuleError {
    fn from(e: std::io::Error) -> Self {
        ModuleError::Storage(e.to_string())
    }
}
