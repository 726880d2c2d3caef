//! UseCase layer: the participant registry and broadcaster.

pub mod chat_manager;
pub mod error;

pub use chat_manager::ChatManager;
pub use error::JoinError;
