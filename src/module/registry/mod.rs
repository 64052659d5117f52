//! Module manifest registry
//!
//! Handles manifest parsing, the scope -> descriptor store and the sources
//! the startup manifest is fetched from.

pub mod manifest;
pub mod source;
pub mod store;

pub use manifest::{export_name, parse_manifest, ManifestDocument, ManifestEntry, ModuleDescriptor};
#[cfg(feature = "http-manifest")]
pub use source::HttpManifestSource;
pub use source::{source_for_location, FileManifestSource, ManifestSource};
pub use store::{ManifestStore, ManifestTable};
