use async_trait::async_trait;
use bytes::Bytes;

use super::types::{AudioUpload, ChatMessage, ModelConfig, ModelResponse};
use crate::utils::ProviderError;

/// Chat completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the assembled conversation and return the assistant's reply
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ProviderError>;

    /// Get the name of the provider
    fn name(&self) -> &str;

    /// Validate that the provider is accessible
    async fn validate_connection(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Speech-to-text backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: AudioUpload, model: &str) -> Result<String, ProviderError>;
}

/// Text-to-speech backend, producing MP3 bytes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, ProviderError>;
}
