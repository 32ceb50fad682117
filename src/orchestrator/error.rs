use thiserror::Error;

use crate::store::{ProcessStatus, StoreError};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("document {doc_id} is {status}, expected completed")]
    DocumentNotReady { doc_id: u64, status: ProcessStatus },

    #[error("task {task_id} did not finish within {waited:?}")]
    WaitTimeout {
        task_id: u64,
        waited: std::time::Duration,
    },

    #[error("worker queue is closed")]
    QueueClosed,

    #[error(transparent)]
    Store(#[from] StoreError),
}
