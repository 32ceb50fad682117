use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{OrchestratorError, TaskOrchestrator};

/// Fixed set of workers draining an unbounded queue of task ids.
///
/// [`WorkerPool::submit`] returns as soon as the id is queued.
pub struct WorkerPool {
    sender: mpsc::UnboundedSender<u64>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start(orchestrator: Arc<TaskOrchestrator>, workers: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel::<u64>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|worker| {
                let orchestrator = Arc::clone(&orchestrator);
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move {
                    loop {
                        let next = receiver.lock().await.recv().await;
                        let Some(task_id) = next else {
                            break;
                        };
                        debug!(worker, task_id, "Picked up task");
                        if let Err(e) = orchestrator.run(task_id).await {
                            error!(worker, task_id, error = %e, "Task could not be run");
                        }
                    }
                    debug!(worker, "Worker stopped");
                })
            })
            .collect();

        Self { sender, workers }
    }

    /// Queues a task for background execution.
    pub fn submit(&self, task_id: u64) -> Result<(), OrchestratorError> {
        self.sender
            .send(task_id)
            .map_err(|_| OrchestratorError::QueueClosed)
    }

    /// Stops accepting work, lets queued tasks finish, and joins the workers.
    pub async fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!(error = %e, "Worker terminated abnormally");
            }
        }
    }
}
