//! Wall-clock timestamps for persisted records

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Milliseconds since the Unix epoch; a clock set before 1970 yields 0
pub fn current_timestamp() -> u64 {
    let since_epoch = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed,
        Err(skew) => {
            warn!("Clock is {:?} before the Unix epoch", skew.duration());
            Duration::ZERO
        }
    };
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}
