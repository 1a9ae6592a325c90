use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{CompletionProvider, Transcriber};
use super::types::{AudioUpload, ChatMessage, ModelConfig, ModelResponse, TokenUsage};
use crate::app::GroqConfig;
use crate::utils::ProviderError;

/// Groq's OpenAI-compatible API: chat completions and Whisper transcription
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GroqClient {
    pub fn new(config: &GroqConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
        })
    }

    /// Override the API key (used when the key doesn't come from the environment)
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/openai/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))?;
        Ok(request.bearer_auth(key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = self.authorize(request)?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Groq request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(response)
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else return it raw
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ProviderError> {
        let mut request_body = json!({
            "model": config.model,
            "messages": messages,
        });
        if let Some(temp) = config.temperature {
            request_body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }

        debug!(model = %config.model, messages = messages.len(), "sending chat completion");

        let request = self
            .client
            .post(self.endpoint("chat/completions"))
            .json(&request_body);
        let response: ChatCompletionResponse = self.send(request).await?.json().await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("completion had no message content".to_string())
            })?;

        Ok(ModelResponse {
            content,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model_name: config.model.clone(),
        })
    }

    fn name(&self) -> &str {
        "groq"
    }

    async fn validate_connection(&self) -> Result<bool, ProviderError> {
        let request = self
            .client
            .get(self.endpoint("models"))
            .timeout(Duration::from_secs(5));
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(ProviderError::MissingApiKey(env)) => Err(ProviderError::MissingApiKey(env)),
            Err(e) => {
                debug!("Groq connection check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl Transcriber for GroqClient {
    async fn transcribe(&self, audio: AudioUpload, model: &str) -> Result<String, ProviderError> {
        debug!(filename = %audio.filename, bytes = audio.data.len(), "transcribing audio");

        let part = multipart::Part::bytes(audio.data.to_vec())
            .file_name(audio.filename)
            .mime_str(&audio.content_type)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("model", model.to_string());

        let request = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .multipart(form);
        let response: TranscriptionResponse = self.send(request).await?.json().await?;

        Ok(response.text)
    }
}

// Response structures (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::HeaderMap, routing::post, Json, Router};
    use bytes::Bytes;
    use serde_json::Value;

    async fn spawn_fake_groq() -> String {
        async fn chat(headers: HeaderMap, Json(body): Json<Value>) -> (axum::http::StatusCode, Json<Value>) {
            if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer test-key") {
                return (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "Invalid API Key" } })),
                );
            }
            let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
            let last = body["messages"][count - 1]["content"].as_str().unwrap_or("").to_string();
            (
                axum::http::StatusCode::OK,
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": format!("echo: {}", last) } }],
                    "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
                })),
            )
        }

        async fn transcribe(mut multipart: Multipart) -> Json<Value> {
            let mut model = String::new();
            let mut size = 0;
            while let Some(field) = multipart.next_field().await.unwrap() {
                match field.name() {
                    Some("model") => model = field.text().await.unwrap(),
                    Some("file") => size = field.bytes().await.unwrap().len(),
                    _ => {}
                }
            }
            Json(json!({ "text": format!("{} heard {} bytes", model, size) }))
        }

        let app = Router::new()
            .route("/openai/v1/chat/completions", post(chat))
            .route("/openai/v1/audio/transcriptions", post(transcribe));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(url: String) -> GroqConfig {
        GroqConfig {
            api_url: url,
            api_key_env: "PARLEY_TEST_UNSET_KEY".to_string(),
            ..GroqConfig::default()
        }
    }

    #[tokio::test]
    async fn test_complete_against_fake_server() {
        let url = spawn_fake_groq().await;
        let client = GroqClient::new(&config(url)).unwrap().with_api_key("test-key");

        let response = client
            .complete(
                &[ChatMessage::system("sys"), ChatMessage::user("ping")],
                &ModelConfig::new("llama3-8b-8192"),
            )
            .await
            .unwrap();

        assert_eq!(response.content, "echo: ping");
        assert_eq!(response.usage.unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status_and_message() {
        let url = spawn_fake_groq().await;
        let client = GroqClient::new(&config(url)).unwrap().with_api_key("wrong");

        let err = client
            .complete(&[ChatMessage::user("ping")], &ModelConfig::new("m"))
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = GroqClient::new(&config("http://127.0.0.1:9".to_string())).unwrap();
        assert!(!client.has_api_key());

        let err = client
            .complete(&[ChatMessage::user("ping")], &ModelConfig::new("m"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(ref env) if env == "PARLEY_TEST_UNSET_KEY"));
    }

    #[tokio::test]
    async fn test_transcribe_sends_multipart() {
        let url = spawn_fake_groq().await;
        let client = GroqClient::new(&config(url)).unwrap().with_api_key("test-key");

        let text = client
            .transcribe(
                AudioUpload {
                    filename: "clip.wav".to_string(),
                    content_type: "audio/wav".to_string(),
                    data: Bytes::from_static(b"RIFF1234"),
                },
                "whisper-large-v3",
            )
            .await
            .unwrap();

        assert_eq!(text, "whisper-large-v3 heard 8 bytes");
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota exceeded","type":"x"}}"#),
            "quota exceeded"
        );
        assert_eq!(extract_error_message("bad gateway"), "bad gateway");
    }
}
