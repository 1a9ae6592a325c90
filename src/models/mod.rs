// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod groq;
mod prompt;
mod speech;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use factory::{ProviderFactory, Providers};
pub use groq::GroqClient;
pub use prompt::PromptAssembler;
pub use speech::{split_for_tts, GoogleTts};
pub use traits::{CompletionProvider, SpeechSynthesizer, Transcriber};
pub use types::{AudioUpload, ChatMessage, MessageRole, ModelConfig, ModelResponse, TokenUsage};

#[cfg(test)]
pub use traits::{MockCompletionProvider, MockSpeechSynthesizer, MockTranscriber};
