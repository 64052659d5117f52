//! Remote module system
//!
//! Turns a declarative manifest into live, renderable units loaded at runtime.
//!
//! ## Pipeline
//!
//! - **Registry**: scope -> descriptor, from the startup fetch and runtime registration
//! - **Loader**: attaches each remote entry script once per mount, reports Ready/Failed
//! - **Container**: polls the process-wide registry for the remote's container and
//!   resolves a named export to a renderable unit
//! - **Security**: role check with administrative bypass
//! - **Api**: typed message bus for login, logout and registration
//!
//! Every failure stays with the route that triggered it.

pub mod api;
pub mod container;
pub mod loader;
pub mod registry;
pub mod security;
pub mod traits;
pub mod validation;

pub use api::{MessageBus, MessagePump, ShellMessage};
pub use container::{ContainerRegistry, FactoryResolver, SharedScope};
pub use loader::{ScriptLoader, ScriptMount};
pub use registry::{ManifestStore, ModuleDescriptor};
pub use security::AccessPolicy;
pub use traits::{
    LoadState, ModuleError, ModuleFactory, RemoteContainer, Renderable, ScriptElementId,
    ScriptHost, ScriptLoadResult,
};
