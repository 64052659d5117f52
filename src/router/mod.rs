//! Access-controlled routing over remote modules
//!
//! - [`RouteTable`]: path -> module entry, rebuilt from the manifest
//! - [`decide`]: pure access decision for one path
//! - [`RouteResolver`]: decision plus loading, producing a [`MountedRoute`]

pub mod decision;
pub mod resolver;
pub mod table;
pub mod view;

pub use decision::{decide, RouteDecision, ShellPaths};
pub use resolver::RouteResolver;
pub use table::{normalize_path, RouteEntry, RouteTable};
pub use view::{MountedRoute, RouteView, UnavailableReason};
