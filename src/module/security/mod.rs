//! Access control for remote modules

pub mod permissions;

pub use permissions::AccessPolicy;
