//! Fan-out delivery to participant connections.
//!
//! Each participant gets an `Outbox`: an unbounded queue drained by its own
//! delivery task. Broadcasting only enqueues, so a stalled recipient never
//! delays other recipients or the broadcaster.

pub mod outbox;

pub use outbox::{Outbox, OutboxPusher};
