//! Shared utilities for the chatd server and client.

pub mod logger;
pub mod time;
