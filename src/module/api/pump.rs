//! Applies bus messages to session state and the manifest store

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::module::api::events::{MessageQueue, ShellMessage};
use crate::module::registry::ManifestStore;
use crate::module::traits::ModuleError;
use crate::session::SessionState;

/// Consumer that routes each message to its owner
#[derive(Clone)]
pub struct MessagePump {
    session: Arc<SessionState>,
    manifest: ManifestStore,
}

impl MessagePump {
    pub fn new(session: Arc<SessionState>, manifest: ManifestStore) -> Self {
        Self { session, manifest }
    }

    /// Apply a single message
    pub async fn apply(&self, message: ShellMessage) -> Result<(), ModuleError> {
        debug!("Applying {} message", message.kind());
        match message {
            ShellMessage::Login(login) => {
                self.session.login(login.username, login.role);
            }
            ShellMessage::Logout(_) => {
                self.session.logout();
            }
            ShellMessage::Register(register) => {
                self.manifest.register(register.into_descriptor()).await?;
            }
        }
        Ok(())
    }

    /// Drain `queue` in a background task until every bus handle is dropped
    ///
    /// Rejected messages still count as applied.
    pub fn spawn(self, mut queue: MessageQueue) -> PumpHandle {
        let (applied, watcher) = watch::channel(0u64);
        let task = tokio::spawn(async move {
            while let Some(message) = queue.recv().await {
                let kind = message.kind();
                if let Err(e) = self.apply(message).await {
                    warn!("Rejected {} message: {}", kind, e);
                }
                applied.send_modify(|count| *count += 1);
            }
            info!("Message bus closed, stopping pump");
        });
        PumpHandle {
            task,
            applied: watcher,
        }
    }
}

/// Running pump
pub struct PumpHandle {
    task: JoinHandle<()>,
    applied: watch::Receiver<u64>,
}

impl PumpHandle {
    /// Messages applied so far
    pub fn applied(&self) -> u64 {
        *self.applied.borrow()
    }

    /// Wait until `count` messages have been applied
    ///
    /// Returns `false` if the pump stopped first.
    pub async fn wait_applied(&self, count: u64) -> bool {
        let mut applied = self.applied.clone();
        let ok = applied.wait_for(|n| *n >= count).await.is_ok();
        ok
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the pump to finish draining a closed bus
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}
