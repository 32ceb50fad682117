use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{CompletionError, CompletionRequest, CompletionService, PromptMessage, PromptRole};
use crate::config::Config;

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletion")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompletion {
    /// Fails before any work when the API key is blank.
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        if api_key.trim().is_empty() {
            return Err(CompletionError::MissingCredentials(Config::ENV_OPENAI_API_KEY));
        }

        let mut openai = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            openai = openai.with_api_base(base);
        }

        Ok(Self {
            client: Client::with_config(openai),
            model: model.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        Self::new(
            &config.openai_api_key,
            config.openai_base_url.as_deref(),
            config.llm_model.clone(),
            config.llm_timeout,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_openai_message(message: PromptMessage) -> ChatCompletionRequestMessage {
    match message.role {
        PromptRole::System => ChatCompletionRequestSystemMessage::from(message.content).into(),
        PromptRole::User => ChatCompletionRequestUserMessage::from(message.content).into(),
        PromptRole::Assistant => {
            ChatCompletionRequestAssistantMessage::from(message.content).into()
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let timeout = self.timeout;
        let messages: Vec<ChatCompletionRequestMessage> = request
            .messages
            .into_iter()
            .map(to_openai_message)
            .collect();

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_completion_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()?;

        let response = match tokio::time::timeout(timeout, self.client.chat().create(chat_request))
            .await
        {
            Ok(res) => res?,
            Err(_) => {
                warn!(model = %self.model, ?timeout, "Completion timed out");
                return Err(CompletionError::Timeout(timeout));
            }
        };

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(content)
    }
}
