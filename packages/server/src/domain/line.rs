//! Formatted chat lines.

use std::{fmt, sync::Arc};

/// An immutable, newline-terminated line as it goes on the wire.
///
/// Cloning is cheap; the same allocation is shared by history, the chat
/// log and every recipient queue.
#[derive(Clone, PartialEq, Eq)]
pub struct ChatLine(Arc<[u8]>);

impl ChatLine {
    /// `<timestamp> * <name> has joined\n`
    pub fn joined(timestamp: &str, name: &str) -> Self {
        Self::system(timestamp, name, "has joined")
    }

    /// `<timestamp> * <name> has quit\n`
    pub fn quit(timestamp: &str, name: &str) -> Self {
        Self::system(timestamp, name, "has quit")
    }

    /// `<timestamp> <<name>> <payload>`, newline appended if the payload lacks one.
    pub fn message(timestamp: &str, name: &str, payload: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(timestamp.len() + name.len() + payload.len() + 5);
        buf.extend_from_slice(timestamp.as_bytes());
        buf.extend_from_slice(b" <");
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b"> ");
        buf.extend_from_slice(payload);
        Self::terminated(buf)
    }

    fn system(timestamp: &str, name: &str, event: &str) -> Self {
        Self::terminated(format!("{} * {} {}\n", timestamp, name, event).into_bytes())
    }

    fn terminated(mut buf: Vec<u8>) -> Self {
        if buf.last() != Some(&b'\n') {
            buf.push(b'\n');
        }
        Self(buf.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for ChatLine {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChatLine")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

impl fmt::Display for ChatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
