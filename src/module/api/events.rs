//! Shell message bus
//!
//! Login, logout and remote registration arrive from outside the core (a
//! login form, a remote announcing itself). Any component can publish on the
//! bus and any component can subscribe; Session State and the Manifest Store
//! only ever see typed messages.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::module::registry::manifest::{ManifestEntry, ModuleDescriptor};
use crate::module::traits::ModuleError;

/// `{username, role}` from a login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginMessage {
    pub username: String,
    pub role: String,
}

/// Logout request; carries no payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutMessage {}

/// A remote announcing itself at runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMessage {
    /// Scope
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RegisterMessage {
    /// Descriptor for the manifest store (validated by the store)
    pub fn into_descriptor(self) -> ModuleDescriptor {
        ModuleDescriptor::from_entry(
            self.name,
            ManifestEntry {
                url: self.url,
                components: self.components,
                routes: self.routes,
                permissions: self.permissions,
            },
        )
    }
}

/// Every message the bus carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ShellMessage {
    #[serde(rename = "userLoggedIn")]
    Login(LoginMessage),
    #[serde(rename = "userLoggedOut")]
    Logout(LogoutMessage),
    #[serde(rename = "remoteRegistered")]
    Register(RegisterMessage),
}

impl ShellMessage {
    /// Parse an externally dispatched event
    pub fn from_json(text: &str) -> Result<Self, ModuleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ShellMessage::Login(_) => "login",
            ShellMessage::Logout(_) => "logout",
            ShellMessage::Register(_) => "register",
        }
    }
}

/// Bus for [`ShellMessage`]s
///
/// Each message is queued for the shell's [`MessagePump`] and broadcast to
/// observers. The queue is unbounded and never drops a message; an observer
/// that falls more than `capacity` messages behind skips the oldest ones.
///
/// [`MessagePump`]: crate::module::api::MessagePump
#[derive(Clone)]
pub struct MessageBus {
    observers: broadcast::Sender<ShellMessage>,
    queue: mpsc::UnboundedSender<ShellMessage>,
    published: Arc<AtomicU64>,
}

/// Receiving end of the bus queue; owned by exactly one pump
pub struct MessageQueue {
    receiver: mpsc::UnboundedReceiver<ShellMessage>,
}

impl MessageQueue {
    /// Next message in publish order; `None` once every bus handle is gone
    pub async fn recv(&mut self) -> Option<ShellMessage> {
        self.receiver.recv().await
    }
}

impl MessageBus {
    /// Create a bus and the queue its pump drains
    ///
    /// `capacity` bounds how far each observer may lag.
    pub fn new(capacity: usize) -> (Self, MessageQueue) {
        let (observers, _) = broadcast::channel(capacity.max(1));
        let (queue, receiver) = mpsc::unbounded_channel();
        (
            Self {
                observers,
                queue,
                published: Arc::new(AtomicU64::new(0)),
            },
            MessageQueue { receiver },
        )
    }

    /// Publish a message
    ///
    /// Returns the number of messages queued so far, including this one. A
    /// pump that has applied that many messages has applied this one.
    pub fn publish(&self, message: ShellMessage) -> u64 {
        let kind = message.kind();
        let observers = self.observers.send(message.clone()).unwrap_or(0);

        if self.queue.send(message).is_err() {
            warn!("Message queue closed, {} message will not be applied", kind);
            return self.published();
        }
        let sequence = self.published.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Published {} message #{} ({} observers)",
            kind, sequence, observers
        );
        sequence
    }

    /// Number of messages queued for the pump so far
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }

    /// Observe every message published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ShellMessage> {
        self.observers.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.receiver_count()
    }
}
