use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use super::groq::GroqClient;
use super::speech::GoogleTts;
use super::traits::{CompletionProvider, SpeechSynthesizer, Transcriber};
use crate::app::Config;

/// The set of provider backends a running service talks to
#[derive(Clone)]
pub struct Providers {
    pub completion: Arc<dyn CompletionProvider>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

/// Factory for creating provider instances from configuration
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the Groq-backed completion/transcription client and the TTS client.
    ///
    /// A missing API key is not fatal here: the server still starts and every
    /// provider call reports the missing key to the caller.
    pub fn create(config: &Config) -> Result<Providers> {
        let groq = Arc::new(
            GroqClient::new(&config.groq).context("Failed to build Groq HTTP client")?,
        );
        if !groq.has_api_key() {
            warn!(
                "${} is not set; chat and transcription requests will fail",
                config.groq.api_key_env
            );
        }

        let tts = Arc::new(
            GoogleTts::new(config.speech.tts_url.clone())
                .context("Failed to build text-to-speech HTTP client")?,
        );

        Ok(Providers {
            completion: groq.clone(),
            transcriber: groq,
            synthesizer: tts,
        })
    }

    /// Check whether the completion provider is reachable with the configured key
    pub async fn validate(config: &Config) -> Result<bool> {
        let providers = Self::create(config)?;
        Ok(providers.completion.validate_connection().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_without_key() {
        let mut config = Config::default();
        config.groq.api_key_env = "PARLEY_FACTORY_TEST_UNSET".to_string();

        let providers = ProviderFactory::create(&config).unwrap();
        assert_eq!(providers.completion.name(), "groq");
    }
}
