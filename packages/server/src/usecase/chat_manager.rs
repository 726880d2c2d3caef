//! UseCase: participant registry and broadcast fan-out
//!
//! ## Locking
//!
//! One mutex guards the participant map and the history. `join`, `quit` and
//! `broadcast` hold it for the whole operation, including the chat log write
//! and the enqueue to every recipient, so history order, chat log order and
//! per-recipient delivery order are all the order in which callers acquired
//! the lock. Writes to the sockets themselves happen outside the lock in each
//! participant's delivery task.

use std::{collections::HashMap, sync::Arc};

use chatd_shared::time::{Clock, timestamp_now};
use tokio::sync::Mutex;

use crate::domain::{
    ChatLine, ChatLog, Connection, DisplayName, HistoryBuffer, MessagePusher, PusherChannel,
};

use super::error::JoinError;

struct ChatState {
    participants: HashMap<DisplayName, Box<dyn PusherChannel>>,
    history: HistoryBuffer,
}

/// Registry of connected participants, bounded history and broadcaster.
///
/// One instance per server, shared by every session as `Arc<ChatManager>`.
pub struct ChatManager {
    state: Mutex<ChatState>,
    /// Opens the delivery queue of each joining participant
    pusher: Arc<dyn MessagePusher>,
    /// Optional persisted chat log; failures never affect a broadcast
    chat_log: Option<Arc<dyn ChatLog>>,
    clock: Arc<dyn Clock>,
    history_capacity: usize,
}

impl ChatManager {
    /// Create a new ChatManager
    ///
    /// # Arguments
    ///
    /// * `pusher` - Delivery used to reach participant connections
    /// * `chat_log` - Sink every broadcast line is appended to, if any
    /// * `max_history_lines` - History capacity (zero is treated as one)
    /// * `clock` - Time source for line timestamps
    pub fn new(
        pusher: Arc<dyn MessagePusher>,
        chat_log: Option<Arc<dyn ChatLog>>,
        max_history_lines: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let history = HistoryBuffer::new(max_history_lines);
        let history_capacity = history.capacity();
        Self {
            state: Mutex::new(ChatState {
                participants: HashMap::new(),
                history,
            }),
            pusher,
            chat_log,
            clock,
            history_capacity,
        }
    }

    /// Register `name` and announce it to everyone, the new participant included.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - registered; a delivery task now writes broadcasts to `conn`
    /// * `Err(JoinError::DuplicateName)` - name taken; nothing was changed
    pub async fn join(
        &self,
        name: &DisplayName,
        conn: Arc<dyn Connection>,
    ) -> Result<(), JoinError> {
        let mut state = self.state.lock().await;
        if state.participants.contains_key(name) {
            tracing::warn!("Rejecting join: '{}' is already connected", name);
            return Err(JoinError::DuplicateName(name.to_string()));
        }
        state
            .participants
            .insert(name.clone(), self.pusher.open(name, conn));
        tracing::info!("{} has joined", name);

        let line = ChatLine::joined(&timestamp_now(self.clock.as_ref()), name.as_str());
        self.broadcast_locked(&mut state, line).await;
        Ok(())
    }

    /// Remove `name` and announce it to the remaining participants.
    ///
    /// Removing a name that is not registered does nothing.
    pub async fn quit(&self, name: &DisplayName) {
        let mut state = self.state.lock().await;
        if state.participants.remove(name).is_none() {
            tracing::debug!("Ignoring quit for unknown participant '{}'", name);
            return;
        }
        tracing::info!("{} has quit", name);

        let line = ChatLine::quit(&timestamp_now(self.clock.as_ref()), name.as_str());
        self.broadcast_locked(&mut state, line).await;
    }

    /// Format `payload` as a message from `sender` and send it to everyone.
    pub async fn broadcast(&self, sender: &DisplayName, payload: &[u8]) {
        let timestamp = timestamp_now(self.clock.as_ref());
        let line = ChatLine::message(&timestamp, sender.as_str(), payload);
        let mut state = self.state.lock().await;
        self.broadcast_locked(&mut state, line).await;
    }

    /// The most recent `lines` lines, oldest first, clamped to capacity.
    pub async fn history(&self, lines: usize) -> Vec<u8> {
        let lines = lines.min(self.history_capacity);
        self.state.lock().await.history.messages(lines)
    }

    pub async fn participant_count(&self) -> usize {
        self.state.lock().await.participants.len()
    }

    /// Registered names, sorted
    pub async fn participants(&self) -> Vec<DisplayName> {
        let state = self.state.lock().await;
        let mut names: Vec<DisplayName> = state.participants.keys().cloned().collect();
        names.sort();
        names
    }

    // Callers must hold the state lock.
    async fn broadcast_locked(&self, state: &mut ChatState, line: ChatLine) {
        tracing::debug!("Broadcasting: {}", line.to_string().trim_end());

        state.history.insert(line.clone());

        if let Some(chat_log) = &self.chat_log
            && let Err(e) = chat_log.append(line.as_bytes()).await
        {
            tracing::warn!("Error writing to chat log: {}", e);
        }

        for (name, channel) in &state.participants {
            if !channel.push(line.clone()) {
                tracing::debug!("Delivery to '{}' has stopped, skipping", name);
            }
        }
    }
}
