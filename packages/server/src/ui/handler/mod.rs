//! Connection and request handlers.

pub mod http;
pub mod raw;

pub use http::{get_history, post_message};
pub use raw::{NAME_PROMPT, RawSession, SessionError, SessionLimits};
