//! Shared types for the tronbun helper bridge: error taxonomy and id generation.

pub mod errors;
pub mod id;

pub use errors::{ConfigError, HandlerError, TransportError, TronbunError};
pub use id::{new_command_id, WindowId};

pub type Result<T> = std::result::Result<T, TronbunError>;
