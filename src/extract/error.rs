use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to parse PDF '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("extraction task failed: {0}")]
    Join(String),
}
