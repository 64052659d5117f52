//! Remote script loader implementation
//!
//! Each [`ScriptMount`] owns at most one attached script element. Readiness is
//! reported a fixed settle delay after the platform's load signal, giving the
//! remote time to publish its container. Failures are terminal for the mount;
//! retrying means mounting again.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::module::traits::{LoadState, ScriptElementId, ScriptHost};

/// Creates script mounts against a platform [`ScriptHost`]
#[derive(Clone)]
pub struct ScriptLoader {
    host: Arc<dyn ScriptHost>,
    settle_delay: Duration,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn ScriptHost>, settle_delay: Duration) -> Self {
        Self { host, settle_delay }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// New mount with nothing attached
    pub fn mount(&self) -> ScriptMount {
        let (state, _) = watch::channel(Slot {
            generation: 0,
            state: LoadState::NotRequested,
        });
        ScriptMount {
            host: Arc::clone(&self.host),
            settle_delay: self.settle_delay,
            state: Arc::new(state),
            attached: None,
        }
    }

    /// Mount and attach `url` in one step
    pub fn ensure(&self, url: &str) -> ScriptMount {
        let mut mount = self.mount();
        mount.ensure(url);
        mount
    }
}

/// Watched value; the generation ties each settle task to one attachment
#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u64,
    state: LoadState,
}

struct Attachment {
    id: ScriptElementId,
    url: String,
    task: JoinHandle<()>,
}

/// One mounted consumer of a remote entry script
pub struct ScriptMount {
    host: Arc<dyn ScriptHost>,
    settle_delay: Duration,
    state: Arc<watch::Sender<Slot>>,
    attached: Option<Attachment>,
}

impl ScriptMount {
    /// Make sure a script element for `url` is attached
    ///
    /// Calling again with the same URL does nothing. A different URL tears the
    /// current element down first.
    pub fn ensure(&mut self, url: &str) {
        if let Some(current) = &self.attached {
            if current.url == url {
                debug!("Script {} already attached as {}", url, current.id);
                return;
            }
        }
        self.teardown();

        let id = ScriptElementId::new();
        let generation = self.advance(LoadState::Loading);
        let completion = self.host.attach(id, url);
        info!("Attached remote entry {} as {}", url, id);

        let state = Arc::clone(&self.state);
        let settle_delay = self.settle_delay;
        let script_url = url.to_string();
        let task = tokio::spawn(async move {
            let next = match completion.await {
                Ok(Ok(())) => {
                    sleep(settle_delay).await;
                    debug!("Remote entry {} settled", script_url);
                    LoadState::Ready
                }
                Ok(Err(reason)) => {
                    warn!("Remote entry {} failed to load: {}", script_url, reason);
                    LoadState::Failed
                }
                Err(_) => {
                    warn!("Script host dropped load signal for {}", script_url);
                    LoadState::Failed
                }
            };
            state.send_if_modified(|slot| {
                if slot.generation != generation {
                    return false;
                }
                slot.state = next;
                true
            });
        });

        self.attached = Some(Attachment {
            id,
            url: url.to_string(),
            task,
        });
    }

    /// Current load state
    pub fn state(&self) -> LoadState {
        self.state.borrow().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.state() == LoadState::Failed
    }

    /// URL currently attached, if any
    pub fn url(&self) -> Option<&str> {
        self.attached.as_ref().map(|a| a.url.as_str())
    }

    /// Wait until the mount is Ready or Failed
    ///
    /// Returns `NotRequested` straight away when nothing is attached.
    pub async fn wait_settled(&self) -> LoadState {
        let mut rx = self.state.subscribe();
        let result = rx
            .wait_for(|slot| slot.state.is_settled() || slot.state == LoadState::NotRequested)
            .await
            .map(|slot| slot.state);
        // The sender lives in `self`, so the channel cannot close while we wait
        result.unwrap_or(LoadState::NotRequested)
    }

    /// Detach the element and stop observing it
    ///
    /// The platform's fetch is not cancelled, and anything the script has
    /// registered stays registered.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(attachment) = self.attached.take() {
            self.advance(LoadState::NotRequested);
            attachment.task.abort();
            self.host.detach(attachment.id);
            info!("Detached remote entry {} ({})", attachment.url, attachment.id);
        }
    }

    /// Start a new generation so older settle tasks can no longer write
    fn advance(&self, state: LoadState) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|slot| {
            slot.generation += 1;
            slot.state = state;
            generation = slot.generation;
        });
        generation
    }
}

impl Drop for ScriptMount {
    fn drop(&mut self) {
        self.teardown();
    }
}
