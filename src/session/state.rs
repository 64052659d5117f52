//! Session state
//!
//! Tracks who is signed in. The phase starts as `Checking` and only becomes
//! `Authenticated` or `Unauthenticated` once [`SessionState::restore`] has read
//! the persisted copy, so a reload never flashes the signed-out view.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::module::traits::ModuleError;
use crate::session::navigation::Navigator;
use crate::session::storage::SessionStorage;
use crate::utils::{current_timestamp, log_error};

/// Authenticated identity, as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: String,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "loginTime")]
    pub login_time: u64,
}

/// Lifecycle phase of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Persisted copy not read yet
    Checking,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionPhase {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionPhase::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Owner of the current session
pub struct SessionState {
    phase: watch::Sender<SessionPhase>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    storage_key: String,
    root_path: String,
}

impl SessionState {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        storage_key: impl Into<String>,
        root_path: impl Into<String>,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Checking);
        Self {
            phase,
            storage,
            navigator,
            storage_key: storage_key.into(),
            root_path: root_path.into(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    /// Current session, if signed in
    pub fn current(&self) -> Option<Session> {
        self.phase.borrow().session().cloned()
    }

    /// Current role, if signed in
    pub fn role(&self) -> Option<String> {
        self.phase.borrow().session().map(|s| s.role.clone())
    }

    /// Observe phase changes
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Read the persisted session
    ///
    /// Never fails: a missing, unreadable or corrupt record leaves the user
    /// signed out, and a corrupt record is erased.
    pub fn restore(&self) -> SessionPhase {
        let phase = match self.storage.read(&self.storage_key) {
            Ok(Some(text)) => match serde_json::from_str::<Session>(&text) {
                Ok(session) => {
                    info!("Restored session for {} ({})", session.username, session.role);
                    SessionPhase::Authenticated(session)
                }
                Err(e) => {
                    let err = ModuleError::PersistedStateCorrupt(e.to_string());
                    warn!("{}; discarding persisted session", err);
                    log_error(
                        || self.storage.remove(&self.storage_key),
                        "Failed to erase corrupt session",
                    );
                    SessionPhase::Unauthenticated
                }
            },
            Ok(None) => {
                debug!("No persisted session");
                SessionPhase::Unauthenticated
            }
            Err(e) => {
                warn!("Could not read persisted session: {}", e);
                SessionPhase::Unauthenticated
            }
        };

        self.phase.send_replace(phase.clone());
        phase
    }

    /// Sign in, persisting the session
    ///
    /// The new role is visible to the next access decision even if
    /// persisting fails.
    pub fn login(&self, username: impl Into<String>, role: impl Into<String>) -> Session {
        let session = Session {
            username: username.into(),
            role: role.into(),
            login_time: current_timestamp(),
        };

        log_error(
            || -> Result<(), ModuleError> {
                let text = serde_json::to_string(&session)?;
                self.storage.write(&self.storage_key, &text)
            },
            "Failed to persist session",
        );

        info!("User {} logged in as {}", session.username, session.role);
        self.phase
            .send_replace(SessionPhase::Authenticated(session.clone()));
        session
    }

    /// Sign out: clear the session, erase the persisted copy and hard-navigate to root
    pub fn logout(&self) {
        let previous = self.phase.send_replace(SessionPhase::Unauthenticated);
        if let Some(session) = previous.session() {
            info!("User {} logged out", session.username);
        }

        log_error(
            || self.storage.remove(&self.storage_key),
            "Failed to erase persisted session",
        );
        self.navigator.hard_navigate(&self.root_path);
    }
}
