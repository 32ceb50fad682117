use thiserror::Error;

use super::ProcessStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document {0} not found")]
    DocumentNotFound(u64),

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("illegal status transition {from} -> {to}")]
    InvalidTransition {
        from: ProcessStatus,
        to: ProcessStatus,
    },
}
