use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::mode::ChatMode;
use crate::models::ChatMessage;

/// Per-user conversational state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub mode: ChatMode,
    pub history: Vec<ChatMessage>,
}

/// In-memory session store keyed by user id
///
/// Sessions are created on first reference. The outer map lock is only held
/// long enough to find or insert a user's slot; each slot has its own mutex, so
/// different users never wait on one another.
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    /// When set, whole exchanges are dropped from the front while history stays
    /// at or above this many messages (an odd cap keeps one extra)
    max_stored_messages: Option<usize>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_stored_messages: None,
        }
    }

    pub fn with_max_stored_messages(mut self, max: Option<usize>) -> Self {
        self.max_stored_messages = max;
        self
    }

    fn slot(&self, user_id: &str) -> Arc<Mutex<Session>> {
        // Fast path: slot already exists
        if let Some(slot) = self.sessions.read().get(user_id) {
            return slot.clone();
        }

        let mut sessions = self.sessions.write();
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id, "creating session");
                Arc::new(Mutex::new(Session::default()))
            })
            .clone()
    }

    /// Snapshot of the user's session, creating it if needed
    pub fn get_or_create(&self, user_id: &str) -> Session {
        self.slot(user_id).lock().clone()
    }

    pub fn set_mode(&self, user_id: &str, mode: ChatMode) {
        self.slot(user_id).lock().mode = mode;
    }

    pub fn get_mode(&self, user_id: &str) -> ChatMode {
        self.slot(user_id).lock().mode
    }

    /// Append one user/assistant exchange as a single atomic step
    pub fn append_exchange(&self, user_id: &str, user_text: &str, assistant_text: &str) {
        let slot = self.slot(user_id);
        let mut session = slot.lock();
        session.history.push(ChatMessage::user(user_text));
        session.history.push(ChatMessage::assistant(assistant_text));

        if let Some(max) = self.max_stored_messages {
            // Never trim below the cap, or the replay window comes up short
            let mut drop = 0;
            while session.history.len() - drop >= max + 2 {
                drop += 2;
            }
            session.history.drain(0..drop);
        }
    }

    /// Full stored history, oldest first
    pub fn get_history(&self, user_id: &str) -> Vec<ChatMessage> {
        self.slot(user_id).lock().history.clone()
    }

    /// The last `n` stored messages, oldest first
    pub fn recent_history(&self, user_id: &str, n: usize) -> Vec<ChatMessage> {
        let slot = self.slot(user_id);
        let session = slot.lock();
        let start = session.history.len().saturating_sub(n);
        session.history[start..].to_vec()
    }

    /// Empty the user's history, leaving the mode alone
    pub fn clear_history(&self, user_id: &str) {
        self.slot(user_id).lock().history.clear();
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

}
