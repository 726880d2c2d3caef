//! Raw TCP session handler.
//!
//! One `RawSession` per accepted connection:
//!
//! ```text
//! AwaitingName ──join ok──▶ Joined ──read error / EOF──▶ Terminated
//!      │                                                    ▲
//!      └──── prompt/read failure, invalid or taken name ────┘
//! ```
//!
//! Every failure is terminal for the session. There is no leave command;
//! a participant leaves by closing the connection.

use std::{io, sync::Arc};

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::{Connection, DisplayName, NameError},
    usecase::{ChatManager, JoinError},
};

/// Prompt written as soon as the connection is accepted
pub const NAME_PROMPT: &str = "What's your name?: ";

/// Per-session buffer and name limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Size of the read buffer, i.e. the largest chunk broadcast at once
    pub msg_buffer_size: usize,
    /// Longest accepted display name, in bytes
    pub max_name_length: usize,
}

/// Reasons a session is disconnected before joining.
///
/// The `Display` text is what the client sees after `Disconnecting: `.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error requesting name: {0}")]
    Prompt(#[source] io::Error),

    #[error("Error reading name: {0}")]
    ReadName(#[source] io::Error),

    #[error("Invalid name")]
    InvalidName(#[source] NameError),

    #[error(transparent)]
    Join(#[from] JoinError),
}

#[derive(Debug)]
enum SessionState {
    AwaitingName,
    Joined(DisplayName),
    Terminated,
}

pub struct RawSession {
    manager: Arc<ChatManager>,
    conn: Arc<dyn Connection>,
    limits: SessionLimits,
    peer: String,
    buf: Vec<u8>,
}

impl RawSession {
    pub fn new(
        manager: Arc<ChatManager>,
        conn: Arc<dyn Connection>,
        limits: SessionLimits,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            conn,
            limits,
            peer: peer.into(),
            buf: vec![0; limits.msg_buffer_size.max(1)],
        }
    }

    /// Drive the session until it terminates.
    pub async fn run(mut self) {
        let span = tracing::info_span!("session", id = %Uuid::new_v4(), peer = %self.peer);
        async move {
            tracing::debug!("Session started");
            let mut state = SessionState::AwaitingName;
            loop {
                state = match state {
                    SessionState::AwaitingName => self.negotiate().await,
                    SessionState::Joined(name) => self.relay(name).await,
                    SessionState::Terminated => break,
                };
            }
            tracing::debug!("Session terminated");
        }
        .instrument(span)
        .await
    }

    async fn negotiate(&mut self) -> SessionState {
        match self.join().await {
            Ok(name) => SessionState::Joined(name),
            Err(e) => {
                tracing::warn!("Disconnecting before join: {}", e);
                self.disconnect(&e).await;
                SessionState::Terminated
            }
        }
    }

    async fn join(&mut self) -> Result<DisplayName, SessionError> {
        let name = self.request_name().await?;
        self.manager.join(&name, self.conn.clone()).await?;
        Ok(name)
    }

    /// Prompt for a name and validate the reply.
    ///
    /// A single read is taken as the reply; only its first line is the name.
    async fn request_name(&mut self) -> Result<DisplayName, SessionError> {
        self.conn
            .write(NAME_PROMPT.as_bytes())
            .await
            .map_err(SessionError::Prompt)?;
        let n = read_chunk(self.conn.as_ref(), &mut self.buf)
            .await
            .map_err(SessionError::ReadName)?;
        let reply = &self.buf[..n];
        let line = reply
            .iter()
            .position(|&b| b == b'\n')
            .map_or(reply, |end| &reply[..end]);
        let raw = String::from_utf8_lossy(line);
        DisplayName::parse(&raw, self.limits.max_name_length).map_err(SessionError::InvalidName)
    }

    async fn relay(&mut self, name: DisplayName) -> SessionState {
        loop {
            match read_chunk(self.conn.as_ref(), &mut self.buf).await {
                Ok(n) => self.manager.broadcast(&name, &self.buf[..n]).await,
                Err(e) => {
                    tracing::info!("Connection for '{}' ended: {}", name, e);
                    self.manager.quit(&name).await;
                    self.close().await;
                    return SessionState::Terminated;
                }
            }
        }
    }

    async fn disconnect(&self, reason: &SessionError) {
        let notice = format!("Disconnecting: {}\n", reason);
        if let Err(e) = self.conn.write(notice.as_bytes()).await {
            tracing::debug!("Failed to send disconnect notice: {}", e);
        }
        self.close().await;
    }

    async fn close(&self) {
        if let Err(e) = self.conn.close().await {
            tracing::debug!("Failed to close connection: {}", e);
        }
    }
}

/// Read once, treating end of stream as an error.
async fn read_chunk(conn: &dyn Connection, buf: &mut [u8]) -> io::Result<usize> {
    match conn.read(buf).await? {
        0 => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by peer",
        )),
        n => Ok(n),
    }
}
