use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;

use super::{ComparisonTask, Document, DocumentStore, ProcessStatus, StoreError};

#[derive(Default)]
struct Tables {
    documents: HashMap<u64, Document>,
    tasks: HashMap<u64, ComparisonTask>,
    next_document_id: u64,
    next_task_id: u64,
}

/// Ids handed out per store under a random base.
const ID_BLOCK_BITS: u32 = 32;

/// Process-local [`DocumentStore`]. Ids start at 1 unless a base is given.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document and task ids start at `base + 1`.
    ///
    /// Document ids key the chunks in the shared index, so stores that write to
    /// the same collection need disjoint id ranges.
    pub fn with_id_base(base: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tables {
                next_document_id: base,
                next_task_id: base,
                ..Tables::default()
            })),
        }
    }

    /// Picks a random block of `2^32` ids, kept below `i64::MAX` for the index payload.
    pub fn with_random_id_base() -> Self {
        let block: u64 = rand::thread_rng().gen_range(1..(1u64 << 31));
        Self::with_id_base(block << ID_BLOCK_BITS)
    }
}

fn check_transition(from: ProcessStatus, to: ProcessStatus) -> Result<(), StoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(StoreError::InvalidTransition { from, to })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, filename: &str, file_path: PathBuf) -> Document {
        let mut tables = self.inner.write().await;
        tables.next_document_id += 1;
        let document = Document {
            id: tables.next_document_id,
            filename: filename.to_string(),
            file_path,
            status: ProcessStatus::Pending,
            error_message: None,
            created_at: Utc::now(),
        };
        tables.documents.insert(document.id, document.clone());
        document
    }

    async fn document(&self, id: u64) -> Result<Document, StoreError> {
        self.inner
            .read()
            .await
            .documents
            .get(&id)
            .cloned()
            .ok_or(StoreError::DocumentNotFound(id))
    }

    async fn set_document_status(
        &self,
        id: u64,
        status: ProcessStatus,
        error_message: Option<String>,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        let document = tables
            .documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        check_transition(document.status, status)?;
        document.status = status;
        document.error_message = error_message;
        Ok(())
    }

    async fn create_task(&self, source_doc_id: u64, target_doc_id: u64) -> ComparisonTask {
        let mut tables = self.inner.write().await;
        tables.next_task_id += 1;
        let task = ComparisonTask {
            id: tables.next_task_id,
            source_doc_id,
            target_doc_id,
            status: ProcessStatus::Pending,
            created_at: Utc::now(),
            result: None,
        };
        tables.tasks.insert(task.id, task.clone());
        task
    }

    async fn task(&self, id: u64) -> Result<ComparisonTask, StoreError> {
        self.inner
            .read()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    async fn set_task_status(&self, id: u64, status: ProcessStatus) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        check_transition(task.status, status)?;
        task.status = status;
        Ok(())
    }

    async fn finish_task(
        &self,
        id: u64,
        status: ProcessStatus,
        result: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        if !status.is_terminal() {
            return Err(StoreError::InvalidTransition {
                from: task.status,
                to: status,
            });
        }
        check_transition(task.status, status)?;
        task.status = status;
        task.result = Some(result);
        Ok(())
    }
}
