//! Container discovery and factory resolution
//!
//! The registry is process-wide shared state; every lookup goes through
//! [`FactoryResolver`] rather than touching the registry directly.

pub mod registry;
pub mod resolver;
pub mod shared;

pub use registry::ContainerRegistry;
pub use resolver::FactoryResolver;
pub use shared::{SharedDependency, SharedScope, HOST_PROVIDER};
