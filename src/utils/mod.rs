//! Utility modules for logging, timing and graceful degradation

pub mod error;
pub mod logging;
pub mod retry;
pub mod time;

// Re-export commonly used items
pub use error::{log_error, with_fallback_async};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use logging::{init_logging, init_logging_from_config};
pub use retry::{PollOutcome, PollPolicy};
pub use time::current_timestamp;
