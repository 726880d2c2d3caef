//! Delivery capability used by the registry.

use std::sync::Arc;

use super::{ChatLine, Connection, DisplayName};

/// Opens a delivery queue for each participant that joins.
///
/// The use case layer depends on this trait only; the queueing and the
/// socket writes live in the infrastructure layer.
pub trait MessagePusher: Send + Sync {
    /// Start delivering to `conn` and return the write-only handle for it.
    fn open(&self, name: &DisplayName, conn: Arc<dyn Connection>) -> Box<dyn PusherChannel>;
}

/// Write-only handle to one participant's delivery queue.
pub trait PusherChannel: Send + Sync {
    /// Enqueue `line` without waiting for it to be written.
    ///
    /// Returns `false` when delivery has stopped.
    fn push(&self, line: ChatLine) -> bool;
}
