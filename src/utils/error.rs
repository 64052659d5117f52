//! Recover-locally helpers
//!
//! Session persistence and the startup manifest fetch must never take the
//! shell down; these helpers log the failure and hand back a neutral value.

use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Run a fallible step, logging a failure as a warning
///
/// `None` means the step failed and has already been reported.
pub fn log_error<T, E: Display>(step: impl FnOnce() -> Result<T, E>, what: &str) -> Option<T> {
    step().map_err(|e| warn!("{}: {}", what, e)).ok()
}

/// Await `attempt`; on failure log it and return `fallback()` instead
pub async fn with_fallback_async<T, E, Fut>(
    attempt: impl FnOnce() -> Fut,
    fallback: impl FnOnce() -> T,
    what: &str,
) -> T
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match attempt().await {
        Ok(value) => value,
        Err(e) => {
            warn!("{}: {}; continuing without it", what, e);
            fallback()
        }
    }
}
