use std::sync::Arc;

use crate::app::Config;
use crate::audio::AudioStore;
use crate::models::{Providers, SpeechSynthesizer, Transcriber};
use crate::runtime::ChatService;
use crate::session::ConversationStore;

/// Global application state shared by every request handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Config>,
    /// Mode resolution, prompt assembly and completion
    pub chat: ChatService,
    /// Speech-to-text backend
    pub transcriber: Arc<dyn Transcriber>,
    /// Text-to-speech backend
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Saved audio responses
    pub audio: AudioStore,
}

impl AppState {
    /// Create new app state
    pub fn new(config: Config, providers: Providers) -> Self {
        let store = Arc::new(
            ConversationStore::new()
                .with_max_stored_messages(config.generation.max_stored_messages),
        );
        let chat = ChatService::new(store, providers.completion, &config);
        let audio = AudioStore::new(config.speech.audio_dir.clone());

        Self {
            config: Arc::new(config),
            chat,
            transcriber: providers.transcriber,
            synthesizer: providers.synthesizer,
            audio,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        self.chat.store()
    }
}
