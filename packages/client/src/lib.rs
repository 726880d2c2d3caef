//! Interactive line client for the chatd raw TCP protocol.
//!
//! The server drives the conversation (name prompt, announcements); the
//! client only relays stdin lines to the socket and socket bytes to stdout.

pub mod error;
pub mod session;

pub use error::ClientError;
pub use session::run_client;
