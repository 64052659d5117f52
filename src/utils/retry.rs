//! Bounded polling for asynchronously appearing state
//!
//! A remote registers its container some time after its script has executed.
//! [`PollPolicy`] probes for a value at a fixed interval and gives up after a
//! fixed number of waits, returning a tagged [`PollOutcome`] instead of looping
//! open-endedly.

use std::time::Duration;
use tokio::time::sleep;

/// Fixed-interval poll configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of waits before giving up
    pub max_attempts: u32,
    /// Delay between probes
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_millis(100),
        }
    }
}

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// Value appeared; `attempts` is the number of waits it took (0 = immediately)
    Found { value: T, attempts: u32 },
    /// Value never appeared after `attempts` waits
    NotFound { attempts: u32 },
}

impl<T> PollOutcome<T> {
    /// Convert into an `Option`, discarding the attempt count
    pub fn into_option(self) -> Option<T> {
        match self {
            PollOutcome::Found { value, .. } => Some(value),
            PollOutcome::NotFound { .. } => None,
        }
    }

    /// Number of waits performed
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Found { attempts, .. } | PollOutcome::NotFound { attempts } => *attempts,
        }
    }
}

impl PollPolicy {
    /// Create a new poll policy
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Longest time a poll can take before reporting `NotFound`
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Probe once immediately, then once after each wait, up to `max_attempts` waits
    pub async fn poll<T, F>(&self, mut probe: F) -> PollOutcome<T>
    where
        F: FnMut() -> Option<T>,
    {
        if let Some(value) = probe() {
            return PollOutcome::Found { value, attempts: 0 };
        }

        for attempt in 1..=self.max_attempts {
            sleep(self.interval).await;
            if let Some(value) = probe() {
                return PollOutcome::Found {
                    value,
                    attempts: attempt,
                };
            }
            tracing::trace!("Poll attempt {}/{} found nothing", attempt, self.max_attempts);
        }

        PollOutcome::NotFound {
            attempts: self.max_attempts,
        }
    }
}
