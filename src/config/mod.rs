//! Configuration management for the host shell
//!
//! Handles configuration loading (JSON or TOML) with defaults for every field,
//! so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::utils::PollPolicy;

/// Host shell configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Well-known location of the module manifest (path or URL)
    #[serde(default = "default_manifest_location")]
    pub manifest_location: String,

    /// Root path: home view and target of the logout hard navigation
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Login path, always rendered regardless of session
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Role that bypasses every permission check
    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    /// Durable key under which the session is persisted
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Directory for the file-backed session store
    #[serde(default = "default_session_dir")]
    pub session_dir: String,

    /// Remote script loader settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Container discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Shared dependencies the host provides to every remote
    #[serde(default)]
    pub shared: HashMap<String, SharedDependencyConfig>,

    /// How far a bus observer may lag before skipping messages (the shell itself never skips)
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_manifest_location() -> String {
    "/config.json".to_string()
}

fn default_root_path() -> String {
    "/".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}

fn default_session_key() -> String {
    "session".to_string()
}

fn default_session_dir() -> String {
    "data/session".to_string()
}

fn default_bus_capacity() -> usize {
    64
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            manifest_location: default_manifest_location(),
            root_path: default_root_path(),
            login_path: default_login_path(),
            admin_role: default_admin_role(),
            session_key: default_session_key(),
            session_dir: default_session_dir(),
            loader: LoaderConfig::default(),
            discovery: DiscoveryConfig::default(),
            shared: HashMap::new(),
            bus_capacity: default_bus_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShellConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShellConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            other => anyhow::bail!(
                "Unsupported config format {:?} for {}",
                other,
                path.display()
            ),
        }
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Poll policy used by container discovery
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.discovery.max_attempts,
            Duration::from_millis(self.discovery.interval_ms),
        )
    }

    /// Settle delay applied after a script reports loaded
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.loader.settle_delay_ms)
    }
}

/// Remote script loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Grace period between the script load signal and reporting Ready (ms)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    100
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Container discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum number of poll waits before ContainerNotFound
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Interval between polls (ms)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval_ms() -> u64 {
    100
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// A shared dependency the host offers in the shared scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDependencyConfig {
    /// Version the host provides
    pub version: String,

    /// Only one instance may exist process-wide
    #[serde(default = "default_true")]
    pub singleton: bool,

    /// Provided at handshake time rather than on first use
    #[serde(default = "default_true")]
    pub eager: bool,

    /// Version range consumers are expected to accept
    #[serde(default)]
    pub required_version: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "remote_shell::module=debug"); RUST_LOG takes precedence
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}
