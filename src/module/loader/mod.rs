//! Remote script loading
//!
//! Attaches remote entry scripts to the platform and tracks their load state.

pub mod loader;

pub use loader::{ScriptLoader, ScriptMount};
