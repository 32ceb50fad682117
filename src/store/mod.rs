//! Document and comparison-task records.

mod error;
mod memory;
mod model;


pub use error::StoreError;
pub use memory::MemoryStore;
pub use model::{ComparisonTask, Document, ProcessStatus};

use std::path::PathBuf;

use async_trait::async_trait;

/// Persistence for documents and tasks. Status writes are checked against
/// [`ProcessStatus::can_transition_to`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Registers a document in `pending`.
    async fn create_document(&self, filename: &str, file_path: PathBuf) -> Document;

    async fn document(&self, id: u64) -> Result<Document, StoreError>;

    async fn set_document_status(
        &self,
        id: u64,
        status: ProcessStatus,
        error_message: Option<String>,
    ) -> Result<(), StoreError>;

    /// Registers a task in `pending` with no result.
    async fn create_task(&self, source_doc_id: u64, target_doc_id: u64) -> ComparisonTask;

    async fn task(&self, id: u64) -> Result<ComparisonTask, StoreError>;

    async fn set_task_status(&self, id: u64, status: ProcessStatus) -> Result<(), StoreError>;

    /// Moves a task to a terminal status and stores its result in one write.
    async fn finish_task(
        &self,
        id: u64,
        status: ProcessStatus,
        result: serde_json::Value,
    ) -> Result<(), StoreError>;
}
