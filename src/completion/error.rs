use std::time::Duration;

use thiserror::Error;

/// Errors from the text-completion service. None of these are recovered
/// locally; they abort the task that issued the call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion returned no content")]
    EmptyResponse,

    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),
}

impl From<async_openai::error::OpenAIError> for CompletionError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        CompletionError::Request(err.to_string())
    }
}
