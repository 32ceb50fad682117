//! Text-completion (LLM) service used for every natural-language judgment.

mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod openai;
pub mod prompts;

pub use error::CompletionError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCompletion;
pub use openai::OpenAiCompletion;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }
}

/// One completion call: ordered messages plus sampling limits.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<PromptMessage>, max_tokens: u32) -> Self {
        Self {
            messages,
            max_tokens,
            temperature: crate::constants::COMPLETION_TEMPERATURE,
        }
    }
}

/// Stateless prompt → response service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the trimmed response text; empty output is an error.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
