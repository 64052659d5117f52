//! Tracing setup for the shell and its tools
//!
//! Filter precedence: `RUST_LOG`, then `[logging] filter` from the shell
//! config, then [`DEFAULT_FILTER`].
//!
//! ```rust,no_run
//! use remote_shell::utils::init_logging;
//!
//! init_logging(Some("remote_shell::router=debug"));
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when neither the environment nor the config sets one
pub const DEFAULT_FILTER: &str = "info";

fn resolve_filter(configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = configured.unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?} ({}), using {}", directives, e, DEFAULT_FILTER);
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Human-readable output on stderr
///
/// A subscriber that is already installed wins; later calls do nothing.
pub fn init_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// One JSON object per event
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true),
        )
        .with(resolve_filter(filter))
        .try_init();
}

/// Install a subscriber as described by the `[logging]` config section
pub fn init_logging_from_config(config: Option<&LoggingConfig>) {
    let filter = config.and_then(|c| c.filter.as_deref());
    let json = config.is_some_and(|c| c.json_format);

    #[cfg(feature = "json-logging")]
    {
        if json {
            init_json_logging(filter);
            return;
        }
    }
    #[cfg(not(feature = "json-logging"))]
    {
        if json {
            eprintln!("json_format requested but the json-logging feature is disabled");
        }
    }

    init_logging(filter);
}
