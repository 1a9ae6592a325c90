use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::traits::SpeechSynthesizer;
use crate::constants::{HTTP_REQUEST_TIMEOUT_SECS, TTS_MAX_CHUNK_CHARS};
use crate::utils::ProviderError;

/// Text-to-speech through the Google Translate TTS endpoint
///
/// The endpoint only takes short strings, so text is split into chunks on word
/// boundaries and the returned MP3 frames are concatenated.
pub struct GoogleTts {
    client: Client,
    url: String,
}

impl GoogleTts {
    pub fn new(url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
                .build()?,
            url: url.into(),
        })
    }

    async fn fetch_chunk(&self, chunk: &str, language: &str) -> Result<Bytes, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: format!("text-to-speech request rejected for language '{}'", language),
            });
        }
        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, ProviderError> {
        let chunks = split_for_tts(text, TTS_MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "nothing to synthesize".to_string(),
            ));
        }

        debug!(chunks = chunks.len(), language, "synthesizing speech");

        let mut audio = BytesMut::new();
        for chunk in &chunks {
            audio.extend_from_slice(&self.fetch_chunk(chunk, language).await?);
        }
        Ok(audio.freeze())
    }
}

/// Split text into pieces of at most `max_chars` characters, preferring word
/// boundaries and hard-splitting words that are longer than the limit
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Router};
    use std::collections::HashMap;

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_for_tts("hello there", 100), vec!["hello there"]);
        assert!(split_for_tts("   ", 100).is_empty());
    }

    #[test]
    fn test_split_on_word_boundaries() {
        let chunks = split_for_tts("one two three four", 9);
        assert_eq!(chunks, vec!["one two", "three", "four"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 9));
    }

    #[test]
    fn test_split_long_word() {
        let chunks = split_for_tts("a abcdefghij b", 4);
        assert_eq!(chunks, vec!["a", "abcd", "efgh", "ij", "b"]);
    }

    #[tokio::test]
    async fn test_synthesize_concatenates_chunks() {
        async fn tts(Query(params): Query<HashMap<String, String>>) -> Vec<u8> {
            format!("[{}:{}]", params["tl"], params["q"]).into_bytes()
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/translate_tts", get(tts)))
                .await
                .unwrap();
        });

        let tts = GoogleTts::new(format!("http://{}/translate_tts", addr)).unwrap();
        let long = "word ".repeat(30);
        let audio = tts.synthesize(&long, "en").await.unwrap();
        let text = String::from_utf8(audio.to_vec()).unwrap();

        assert_eq!(text.matches("[en:").count(), 2);
        assert_eq!(text.matches("word").count(), 30);
    }
}
