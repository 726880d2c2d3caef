//! Per-participant delivery queue.
//!
//! ## Delivery policy
//!
//! Lines are fire-and-forget: `push` never waits for the write, write errors
//! are logged and dropped, and nothing is retried. A failing recipient stays
//! registered until its own session notices the broken connection and quits.
//! Lines queued for one recipient are written in the order they were pushed.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{ChatLine, Connection, DisplayName, MessagePusher, PusherChannel};

/// `MessagePusher` that gives every participant its own `Outbox`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutboxPusher;

impl MessagePusher for OutboxPusher {
    fn open(&self, name: &DisplayName, conn: Arc<dyn Connection>) -> Box<dyn PusherChannel> {
        Box::new(Outbox::spawn(name.as_str(), conn))
    }
}

/// Write-only handle the registry keeps for one participant.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: mpsc::UnboundedSender<ChatLine>,
}

impl Outbox {
    /// Start the delivery task for `conn` and return its queue handle.
    ///
    /// The task stops once every `Outbox` clone has been dropped and the
    /// queue is drained. Must be called from within a tokio runtime.
    pub fn spawn(name: &str, conn: Arc<dyn Connection>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(deliver(name.to_string(), conn, receiver));
        Self { sender }
    }

}

impl PusherChannel for Outbox {
    /// Returns `false` when the delivery task is gone.
    fn push(&self, line: ChatLine) -> bool {
        self.sender.send(line).is_ok()
    }
}

async fn deliver(
    name: String,
    conn: Arc<dyn Connection>,
    mut receiver: mpsc::UnboundedReceiver<ChatLine>,
) {
    while let Some(line) = receiver.recv().await {
        match conn.write(line.as_bytes()).await {
            Ok(_) => tracing::trace!("Delivered {} bytes to '{}'", line.len(), name),
            Err(e) => tracing::debug!("Failed to deliver line to '{}': {}", name, e),
        }
    }
    tracing::trace!("Delivery task for '{}' finished", name);
}
