//! Container discovery and factory resolution
//!
//! Resolution order for `resolve(scope, export)`:
//!
//! 1. Await the shared-dependency handshake (idempotent, process-wide)
//! 2. Poll the container registry for `scope` under a bounded [`PollPolicy`]
//! 3. `container.init(shared)`, then `container.get(export)`, then invoke the factory
//!
//! Nothing is cached: every navigation re-polls and re-initializes. Each remote
//! step runs under `catch_unwind`; a panic becomes a resolution error.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::module::container::registry::ContainerRegistry;
use crate::module::container::shared::SharedScope;
use crate::module::traits::{ModuleError, Renderable};
use crate::utils::{PollOutcome, PollPolicy};

/// Resolves `(scope, export)` to a renderable unit
#[derive(Clone)]
pub struct FactoryResolver {
    registry: Arc<ContainerRegistry>,
    shared: Arc<SharedScope>,
    policy: PollPolicy,
}

impl FactoryResolver {
    pub fn new(
        registry: Arc<ContainerRegistry>,
        shared: Arc<SharedScope>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            registry,
            shared,
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<ContainerRegistry> {
        &self.registry
    }

    pub fn shared_scope(&self) -> &Arc<SharedScope> {
        &self.shared
    }

    /// Resolve a named export of a remote into a renderable unit
    ///
    /// Callers must only invoke this once the remote's script loader reports Ready.
    pub async fn resolve(
        &self,
        scope: &str,
        export_name: &str,
    ) -> Result<Arc<dyn Renderable>, ModuleError> {
        self.shared.initialize().await;

        let registry = &self.registry;
        let container = match self.policy.poll(|| registry.lookup(scope)).await {
            PollOutcome::Found { value, attempts } => {
                debug!("Found container {} after {} waits", scope, attempts);
                value
            }
            PollOutcome::NotFound { attempts } => {
                warn!("Container {} not found after {} attempts", scope, attempts);
                return Err(ModuleError::ContainerNotFound {
                    scope: scope.to_string(),
                    attempts,
                });
            }
        };

        let resolution_error = |reason: String| ModuleError::ModuleResolution {
            scope: scope.to_string(),
            export: export_name.to_string(),
            reason,
        };

        contained("container init", container.init(&self.shared))
            .await
            .map_err(resolution_error)?;
        let factory = contained("export lookup", container.get(export_name))
            .await
            .map_err(resolution_error)?;
        let unit = contained("factory", factory.invoke())
            .await
            .map_err(resolution_error)?;

        debug!("Resolved {} from {}", export_name, scope);
        Ok(unit)
    }
}

/// Await one remote-owned step, turning an error or a panic into a diagnostic
async fn contained<T, F>(step: &str, future: F) -> Result<T, String>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{} failed: {:#}", step, e)),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!("Remote {} panicked: {}", step, reason);
            Err(format!("{} panicked: {}", step, reason))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "non-string panic payload"
    }
}
