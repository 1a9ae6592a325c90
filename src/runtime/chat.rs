use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app::Config;
use crate::models::{CompletionProvider, ModelConfig, PromptAssembler, TokenUsage};
use crate::session::{ChatMode, ConversationStore, ModeResolver};
use crate::utils::{ParleyError, ParleyResult};

/// Result of one chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub mode: ChatMode,
    pub usage: Option<TokenUsage>,
}

/// Runs one conversational turn: resolve mode, assemble the prompt from prior
/// history, call the completion provider, then commit the exchange.
///
/// The exchange is only committed after a successful completion, so a failed
/// or timed-out call leaves the history untouched.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<ConversationStore>,
    resolver: ModeResolver,
    assembler: PromptAssembler,
    completion: Arc<dyn CompletionProvider>,
    model_config: ModelConfig,
}

impl ChatService {
    pub fn new(
        store: Arc<ConversationStore>,
        completion: Arc<dyn CompletionProvider>,
        config: &Config,
    ) -> Self {
        let assembler = PromptAssembler::new(store.clone())
            .with_prompts(&config.prompts)
            .with_max_history_messages(config.generation.max_history_messages);

        let model_config = ModelConfig {
            model: config.groq.chat_model.clone(),
            temperature: Some(config.generation.temperature),
            max_tokens: Some(config.generation.max_tokens),
        };

        Self {
            resolver: ModeResolver::new(store.clone()),
            store,
            assembler,
            completion,
            model_config,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn resolver(&self) -> &ModeResolver {
        &self.resolver
    }

    pub fn model_name(&self) -> &str {
        &self.model_config.model
    }

    /// One full turn: respond, then commit the exchange
    pub async fn chat(
        &self,
        user_id: &str,
        explicit_mode: Option<ChatMode>,
        text: &str,
    ) -> ParleyResult<ChatOutcome> {
        let outcome = self.respond(user_id, explicit_mode, text).await?;
        self.commit(user_id, text, &outcome);
        Ok(outcome)
    }

    /// Resolve the mode and get a completion without touching history.
    ///
    /// Callers with further fallible work (speech synthesis) run it before
    /// calling [`ChatService::commit`].
    pub async fn respond(
        &self,
        user_id: &str,
        explicit_mode: Option<ChatMode>,
        text: &str,
    ) -> ParleyResult<ChatOutcome> {
        if text.trim().is_empty() {
            return Err(ParleyError::Validation("Text cannot be empty".to_string()));
        }

        let mode = self.resolver.resolve(user_id, explicit_mode);
        let messages = self.assembler.assemble(user_id, mode, text);
        debug!(user_id, %mode, window = messages.len() - 2, "prompt assembled");

        let response = match self.completion.complete(&messages, &self.model_config).await {
            Ok(response) => response,
            Err(e) => {
                warn!(user_id, %mode, "completion failed: {}", e);
                return Err(e.into());
            }
        };

        Ok(ChatOutcome {
            response: response.content,
            mode,
            usage: response.usage,
        })
    }

    /// Append the exchange produced by [`ChatService::respond`]
    pub fn commit(&self, user_id: &str, text: &str, outcome: &ChatOutcome) {
        self.store.append_exchange(user_id, text, &outcome.response);
        info!(user_id, mode = %outcome.mode, "chat turn committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TASK_PROMPT;
    use crate::models::{ChatMessage, MockCompletionProvider, ModelResponse};
    use crate::utils::ProviderError;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn reply(content: &str) -> ModelResponse {
        ModelResponse {
            content: content.to_string(),
            usage: None,
            model_name: "test".to_string(),
        }
    }

    fn service(mock: MockCompletionProvider) -> ChatService {
        ChatService::new(
            Arc::new(ConversationStore::new()),
            Arc::new(mock),
            &Config::default(),
        )
    }

    #[tokio::test]
    async fn test_turn_commits_exchange() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .times(1)
            .withf(|messages: &[ChatMessage], config: &ModelConfig| {
                messages
                    == [
                        ChatMessage::system(TASK_PROMPT),
                        ChatMessage::user("remind me to call Sam"),
                    ]
                    && config.model == "llama3-8b-8192"
            })
            .returning(|_, _| Ok(reply("Added: call Sam")));

        let service = service(mock);
        let outcome = service
            .chat("u1", Some(ChatMode::Task), "remind me to call Sam")
            .await
            .unwrap();

        assert_eq!(outcome.response, "Added: call Sam");
        assert_eq!(outcome.mode, ChatMode::Task);
        assert_eq!(
            service.store().get_history("u1"),
            vec![
                ChatMessage::user("remind me to call Sam"),
                ChatMessage::assistant("Added: call Sam"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_completion_commits_nothing() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().returning(|_, _| {
            Err(ProviderError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        });

        let service = service(mock);
        service.store().append_exchange("u1", "earlier", "reply");

        let err = service.chat("u1", None, "hello").await.unwrap_err();
        assert!(matches!(err, ParleyError::Provider(ProviderError::Api { status: 503, .. })));
        assert_eq!(service.store().get_history("u1").len(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_provider() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().times(0);

        let service = service(mock);
        let err = service.chat("u1", Some(ChatMode::Task), "   ").await.unwrap_err();
        assert!(matches!(err, ParleyError::Validation(_)));
        // Rejected requests don't change the sticky mode
        assert_eq!(service.store().get_mode("u1"), ChatMode::General);
    }

    #[tokio::test]
    async fn test_request_never_sees_own_answer() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .times(2)
            .returning(|messages: &[ChatMessage], _| {
                // system + prior history + new user message
                Ok(reply(&format!("seen {}", messages.len())))
            });

        let service = service(mock);
        let first = service.chat("u1", None, "one").await.unwrap();
        let second = service.chat("u1", None, "two").await.unwrap();

        assert_eq!(first.response, "seen 2");
        assert_eq!(second.response, "seen 4");
    }

    #[tokio::test]
    async fn test_mode_sticks_across_turns() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete().returning(|messages: &[ChatMessage], _| {
            Ok(reply(&messages[0].content[..10]))
        });

        let service = service(mock);
        service.chat("u1", Some(ChatMode::JobSearch), "cv tips").await.unwrap();
        let outcome = service.chat("u1", None, "more").await.unwrap();

        assert_eq!(outcome.mode, ChatMode::JobSearch);
        assert_eq!(service.store().get_mode("u1"), ChatMode::JobSearch);
    }

    struct SlowProvider;

    #[async_trait::async_trait]
    impl CompletionProvider for SlowProvider {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _config: &ModelConfig,
        ) -> Result<ModelResponse, ProviderError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(reply(&format!("answer to {}", messages.last().unwrap().content)))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_respond_leaves_history_until_commit() {
        let mut mock = MockCompletionProvider::new();
        mock.expect_complete()
            .times(1)
            .returning(|_, _| Ok(reply("noted")));
        let service = service(mock);

        let outcome = service
            .respond("u1", Some(ChatMode::Task), "buy milk")
            .await
            .unwrap();
        assert!(service.store().get_history("u1").is_empty());
        assert_eq!(service.store().get_mode("u1"), ChatMode::Task);

        service.commit("u1", "buy milk", &outcome);
        assert_eq!(
            service.store().get_history("u1"),
            vec![ChatMessage::user("buy milk"), ChatMessage::assistant("noted")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_same_user() {
        let service = ChatService::new(
            Arc::new(ConversationStore::new()),
            Arc::new(SlowProvider),
            &Config::default(),
        );

        let a = service.clone();
        let b = service.clone();
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.chat("u1", None, "alpha").await }),
            tokio::spawn(async move { b.chat("u1", None, "beta").await }),
        );
        ra.unwrap().unwrap();
        rb.unwrap().unwrap();

        let history = service.store().get_history("u1");
        assert_eq!(history.len(), 4);
        for pair in history.chunks(2) {
            assert_eq!(pair[1].content, format!("answer to {}", pair[0].content));
        }
    }
}
