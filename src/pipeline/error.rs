use thiserror::Error;

use crate::completion::CompletionError;
use crate::store::StoreError;
use crate::vectordb::IndexError;

/// Unrecoverable failures of one comparison; the task ends `failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("document {0} not found")]
    DocumentNotFound(u64),

    #[error("target document {0} has no indexed chunks")]
    NoTargetChunks(u64),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}
