pub mod api;
pub mod app;
pub mod audio;
pub mod cli;
pub mod constants;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, AppState, Config};
pub use models::{ChatMessage, CompletionProvider, PromptAssembler, SpeechSynthesizer, Transcriber};
pub use runtime::ChatService;
pub use session::{ChatMode, ConversationStore, ModeResolver};
pub use utils::{ParleyError, ProviderError};
