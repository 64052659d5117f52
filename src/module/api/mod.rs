//! Message bus between the shell core and the outside world

pub mod events;
pub mod pump;

pub use events::{
    LoginMessage, LogoutMessage, MessageBus, MessageQueue, RegisterMessage, ShellMessage,
};
pub use pump::{MessagePump, PumpHandle};
