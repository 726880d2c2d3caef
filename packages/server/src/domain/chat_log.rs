//! Append-only sink for the persisted chat log.

use std::io;

use async_trait::async_trait;

/// Optional sink every broadcast line is written to.
///
/// Failures are reported to the caller, which logs and drops them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatLog: Send + Sync {
    async fn append(&self, line: &[u8]) -> io::Result<()>;
}
