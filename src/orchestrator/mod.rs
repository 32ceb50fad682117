//! Task lifecycle: `pending -> processing -> {completed, failed}`.
//!
//! [`TaskOrchestrator::run`] is the only writer of a task's status once it
//! exists. It moves the task to `processing` before any work, then writes
//! exactly one terminal state together with the result: the report on
//! success, `{"error": message}` on any failure (panics included).

mod error;
mod pool;


pub use error::OrchestratorError;
pub use pool::WorkerPool;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::json;
use tracing::{error, info};

use crate::pipeline::{Comparator, PipelineError};
use crate::store::{ComparisonTask, DocumentStore, ProcessStatus, StoreError};

pub struct TaskOrchestrator {
    store: Arc<dyn DocumentStore>,
    comparator: Arc<Comparator>,
}

impl TaskOrchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, comparator: Arc<Comparator>) -> Self {
        Self { store, comparator }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Creates a `pending` task once both documents are fully ingested.
    pub async fn create_task(
        &self,
        source_doc_id: u64,
        target_doc_id: u64,
    ) -> Result<ComparisonTask, OrchestratorError> {
        for doc_id in [source_doc_id, target_doc_id] {
            let document = self.store.document(doc_id).await?;
            if document.status != ProcessStatus::Completed {
                return Err(OrchestratorError::DocumentNotReady {
                    doc_id,
                    status: document.status,
                });
            }
        }

        let task = self.store.create_task(source_doc_id, target_doc_id).await;
        info!(
            task_id = task.id,
            source_doc_id, target_doc_id, "Comparison task created"
        );
        Ok(task)
    }

    /// Runs a task to its terminal state and returns that state.
    ///
    /// Pipeline failures are recorded on the task, not returned; only store
    /// failures (unknown task, illegal transition) surface as errors.
    pub async fn run(&self, task_id: u64) -> Result<ProcessStatus, OrchestratorError> {
        let task = self.store.task(task_id).await.map_err(|e| match e {
            StoreError::TaskNotFound(id) => OrchestratorError::TaskNotFound(id),
            other => OrchestratorError::Store(other),
        })?;

        self.store
            .set_task_status(task_id, ProcessStatus::Processing)
            .await?;
        info!(task_id, "Task processing");

        let outcome = match AssertUnwindSafe(self.execute(&task)).catch_unwind().await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(panic_message(panic)),
        };

        match outcome {
            Ok(report) => {
                self.store
                    .finish_task(task_id, ProcessStatus::Completed, report)
                    .await?;
                info!(task_id, "Task completed");
                Ok(ProcessStatus::Completed)
            }
            Err(message) => {
                error!(task_id, error = %message, "Task failed");
                self.store
                    .finish_task(task_id, ProcessStatus::Failed, json!({ "error": message }))
                    .await?;
                Ok(ProcessStatus::Failed)
            }
        }
    }

    async fn execute(&self, task: &ComparisonTask) -> Result<serde_json::Value, PipelineError> {
        let source = self.load_document(task.source_doc_id).await?;
        let target = self.load_document(task.target_doc_id).await?;
        let report = self.comparator.compare(&source, &target).await?;
        Ok(serde_json::to_value(&report)?)
    }

    async fn load_document(&self, doc_id: u64) -> Result<crate::store::Document, PipelineError> {
        self.store.document(doc_id).await.map_err(|e| match e {
            StoreError::DocumentNotFound(id) => PipelineError::DocumentNotFound(id),
            other => PipelineError::Store(other),
        })
    }

    /// Polls until the task is terminal, giving up after `timeout`.
    pub async fn wait_for_terminal(
        &self,
        task_id: u64,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<ComparisonTask, OrchestratorError> {
        match tokio::time::timeout(timeout, self.poll_until_terminal(task_id, poll_interval)).await
        {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::WaitTimeout {
                task_id,
                waited: timeout,
            }),
        }
    }

    async fn poll_until_terminal(
        &self,
        task_id: u64,
        poll_interval: Duration,
    ) -> Result<ComparisonTask, OrchestratorError> {
        loop {
            let task = self.store.task(task_id).await?;
            if task.status.is_terminal() {
                return Ok(task);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("task panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("task panicked: {s}")
    } else {
        "task panicked".to_string()
    }
}
