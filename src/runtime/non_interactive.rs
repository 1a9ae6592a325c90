use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    app::Config,
    cli::OutputFormat,
    constants::DEFAULT_USER_ID,
    models::{CompletionProvider, ProviderFactory},
    runtime::ChatService,
    session::{ChatMode, ConversationStore},
};

/// Result of a one-shot `ask`
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// The model's response
    pub response: String,
    /// Mode the prompt ran under
    pub mode: ChatMode,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Model used
    pub model: String,
    /// Total tokens used
    pub tokens_used: Option<usize>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Runs a single prompt through the same chat pipeline the server uses,
/// against a throwaway session
pub struct NonInteractiveRunner {
    chat: ChatService,
}

impl NonInteractiveRunner {
    pub fn new(config: &Config) -> Result<Self> {
        let providers = ProviderFactory::create(config)?;
        Ok(Self::with_provider(config, providers.completion))
    }

    pub fn with_provider(config: &Config, completion: Arc<dyn CompletionProvider>) -> Self {
        let store = Arc::new(ConversationStore::new());
        Self {
            chat: ChatService::new(store, completion, config),
        }
    }

    /// Execute a single prompt and return the result
    pub async fn execute(&self, prompt: String, mode: Option<ChatMode>) -> NonInteractiveResult {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        let (response, resolved_mode, tokens_used) =
            match self.chat.chat(DEFAULT_USER_ID, mode, &prompt).await {
                Ok(outcome) => (
                    outcome.response,
                    outcome.mode,
                    outcome.usage.map(|u| u.total_tokens),
                ),
                Err(e) => {
                    errors.push(e.to_string());
                    (String::new(), mode.unwrap_or_default(), None)
                }
            };

        NonInteractiveResult {
            prompt,
            response,
            mode: resolved_mode,
            errors,
            metadata: ExecutionMetadata {
                model: self.chat.model_name().to_string(),
                tokens_used,
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = result.response.clone();

                if !result.errors.is_empty() {
                    output.push_str("\n--- Errors ---\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                }

                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                output.push_str("## Response\n\n");
                output.push_str(&result.response);
                output.push_str("\n\n");

                if !result.errors.is_empty() {
                    output.push_str("## Errors\n\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                    output.push('\n');
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Mode: {} | Model: {} | Tokens: {} | Duration: {}ms*\n",
                    result.mode,
                    result.metadata.model,
                    result.metadata.tokens_used.unwrap_or(0),
                    result.metadata.duration_ms
                ));

                output
            }
        }
    }
}
