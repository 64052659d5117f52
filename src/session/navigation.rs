//! Navigation seam
//!
//! A hard navigation resets the whole shell at the target path (a full page
//! load), as opposed to a soft in-app route change.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Platform navigation
pub trait Navigator: Send + Sync {
    /// Full reset of the shell at `path`
    fn hard_navigate(&self, path: &str);
}

/// Navigator that tracks the current location in process
pub struct HistoryNavigator {
    location: Mutex<String>,
    hard_navigations: AtomicUsize,
}

impl HistoryNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(initial.into()),
            hard_navigations: AtomicUsize::new(0),
        }
    }

    /// Soft in-app navigation
    pub fn navigate(&self, path: &str) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    pub fn location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of hard navigations performed so far
    pub fn hard_navigations(&self) -> usize {
        self.hard_navigations.load(Ordering::SeqCst)
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn hard_navigate(&self, path: &str) {
        info!("Hard navigation to {}", path);
        self.navigate(path);
        self.hard_navigations.fetch_add(1, Ordering::SeqCst);
    }
}
