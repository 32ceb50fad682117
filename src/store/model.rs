use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of documents and comparison tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Pending => "pending",
            ProcessStatus::Processing => "processing",
            ProcessStatus::Completed => "completed",
            ProcessStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            ProcessStatus::Pending | ProcessStatus::Processing => false,
            ProcessStatus::Completed | ProcessStatus::Failed => true,
        }
    }

    /// `pending -> processing -> {completed, failed}`; nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: ProcessStatus) -> bool {
        match (self, next) {
            (ProcessStatus::Pending, ProcessStatus::Processing) => true,
            (ProcessStatus::Processing, ProcessStatus::Completed) => true,
            (ProcessStatus::Processing, ProcessStatus::Failed) => true,
            (ProcessStatus::Pending, _) => false,
            (ProcessStatus::Processing, _) => false,
            (ProcessStatus::Completed, _) => false,
            (ProcessStatus::Failed, _) => false,
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub filename: String,
    pub file_path: PathBuf,
    pub status: ProcessStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One ordered comparison: `target` is checked against `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTask {
    pub id: u64,
    pub source_doc_id: u64,
    pub target_doc_id: u64,
    pub status: ProcessStatus,
    pub created_at: DateTime<Utc>,
    /// Report on success, `{"error": ...}` on failure, `None` until terminal.
    pub result: Option<serde_json::Value>,
}
