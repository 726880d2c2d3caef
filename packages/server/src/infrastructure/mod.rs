//! Infrastructure layer: concrete transports, sinks and delivery.

pub mod chat_log;
pub mod connection;
pub mod message_pusher;

pub use chat_log::FileChatLog;
pub use connection::StreamConnection;
pub use message_pusher::{Outbox, OutboxPusher};
