use std::sync::Arc;
use tracing::debug;

use super::mode::ChatMode;
use super::store::ConversationStore;

/// Decides which mode a request runs under
///
/// An explicit mode becomes the user's new sticky mode. Without one, whatever
/// the session already holds applies.
#[derive(Clone)]
pub struct ModeResolver {
    store: Arc<ConversationStore>,
}

impl ModeResolver {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, user_id: &str, explicit: Option<ChatMode>) -> ChatMode {
        match explicit {
            Some(mode) => {
                debug!(user_id, %mode, "mode set by request");
                self.store.set_mode(user_id, mode);
                mode
            }
            None => self.store.get_mode(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_mode_is_persisted() {
        let store = Arc::new(ConversationStore::new());
        let resolver = ModeResolver::new(store.clone());

        assert_eq!(resolver.resolve("u1", Some(ChatMode::Task)), ChatMode::Task);
        assert_eq!(store.get_mode("u1"), ChatMode::Task);
    }

    #[test]
    fn test_mode_is_sticky() {
        let store = Arc::new(ConversationStore::new());
        let resolver = ModeResolver::new(store.clone());

        resolver.resolve("u1", Some(ChatMode::JobSearch));
        assert_eq!(resolver.resolve("u1", None), ChatMode::JobSearch);
        assert_eq!(resolver.resolve("u1", None), ChatMode::JobSearch);
        assert_eq!(store.get_mode("u1"), ChatMode::JobSearch);
    }

    #[test]
    fn test_unset_mode_defaults_to_general() {
        let resolver = ModeResolver::new(Arc::new(ConversationStore::new()));
        assert_eq!(resolver.resolve("fresh", None), ChatMode::General);
    }
}
