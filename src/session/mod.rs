//! Session state and persistence
//!
//! - [`SessionState`]: login/logout/restore transitions
//! - [`SessionStorage`]: durable key-value store for the persisted copy
//! - [`Navigator`]: hard navigation performed on logout

pub mod navigation;
pub mod state;
pub mod storage;

pub use navigation::{HistoryNavigator, Navigator};
pub use state::{Session, SessionPhase, SessionState};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
