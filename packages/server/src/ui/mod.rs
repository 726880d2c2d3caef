//! UI layer: listeners, per-connection sessions and the HTTP facade.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::{BoundServer, Server};
