use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("malformed embedding response: {reason}")]
    MalformedResponse { reason: String },

    #[error("invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<async_openai::error::OpenAIError> for EmbeddingError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        EmbeddingError::RequestFailed {
            reason: err.to_string(),
        }
    }
}
