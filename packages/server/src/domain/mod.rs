//! Domain layer: pure chat types and the capabilities the core consumes.
//!
//! Nothing in here touches a socket or a file directly. The transport
//! (`Connection`), fan-out delivery (`MessagePusher`) and the persisted chat
//! log (`ChatLog`) are traits whose implementations live in the
//! infrastructure layer.

pub mod chat_log;
pub mod connection;
pub mod error;
pub mod history;
pub mod line;
pub mod message_pusher;
pub mod name;

pub use chat_log::ChatLog;
pub use connection::Connection;
pub use error::NameError;
pub use history::HistoryBuffer;
pub use line::ChatLine;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use name::DisplayName;

#[cfg(test)]
pub use chat_log::MockChatLog;
