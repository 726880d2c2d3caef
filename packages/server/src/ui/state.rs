//! Shared state for the HTTP facade.

use std::sync::Arc;

use crate::usecase::ChatManager;

use super::handler::SessionLimits;

/// Shared application state
pub struct AppState {
    /// Registry and broadcaster shared with the raw sessions
    pub manager: Arc<ChatManager>,
    /// Name and body size limits, identical to the raw protocol's
    pub limits: SessionLimits,
    /// Lines returned when a request does not ask for a valid number
    pub max_history_lines: usize,
}
