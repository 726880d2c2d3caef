//! Transport capability consumed by the chat core.

use std::io;

use async_trait::async_trait;

/// A byte-stream endpoint.
///
/// The session owns the connection for reads; the registry only ever
/// writes to it (through its delivery queue). No timeouts are applied.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Read into `buf`. `Ok(0)` means the peer closed the stream.
    async fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `buf`, returning the number of bytes written.
    async fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Close the connection. Closing twice is not an error.
    async fn close(&self) -> io::Result<()>;
}
