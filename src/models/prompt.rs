use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::types::ChatMessage;
use crate::constants::{DEFAULT_MAX_HISTORY_MESSAGES, GENERAL_PROMPT};
use crate::session::{ChatMode, ConversationStore};

/// Builds the exact message list sent to the completion provider:
/// `[system, ...last N stored messages, user]`
///
/// Only reads the store. The caller commits the exchange once the provider
/// has answered.
#[derive(Clone)]
pub struct PromptAssembler {
    store: Arc<ConversationStore>,
    prompts: HashMap<ChatMode, String>,
    max_history_messages: usize,
}

impl PromptAssembler {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self {
            store,
            prompts: HashMap::new(),
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
        }
    }

    /// Load the prompt table from config-style `mode name -> text` pairs.
    /// Keys that don't name a mode are ignored.
    pub fn with_prompts(mut self, prompts: &BTreeMap<String, String>) -> Self {
        self.prompts = prompts
            .iter()
            .filter_map(|(key, text)| key.parse::<ChatMode>().ok().map(|mode| (mode, text.clone())))
            .collect();
        self
    }

    pub fn with_max_history_messages(mut self, max: usize) -> Self {
        self.max_history_messages = max;
        self
    }

    pub fn max_history_messages(&self) -> usize {
        self.max_history_messages
    }

    /// System prompt for a mode, falling back to the general prompt
    pub fn system_prompt(&self, mode: ChatMode) -> &str {
        self.prompts
            .get(&mode)
            .or_else(|| self.prompts.get(&ChatMode::General))
            .map(String::as_str)
            .unwrap_or(GENERAL_PROMPT)
    }

    pub fn assemble(&self, user_id: &str, mode: ChatMode, new_text: &str) -> Vec<ChatMessage> {
        let window = self.store.recent_history(user_id, self.max_history_messages);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(mode)));
        messages.extend(window);
        messages.push(ChatMessage::user(new_text));
        messages
    }
}
