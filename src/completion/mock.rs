use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CompletionError, CompletionRequest, CompletionService};

/// Scripted completion service that records every request.
///
/// Replies are consumed in order; once the script runs out the fallback reply
/// is returned. [`MockCompletion::failing`] answers every call with an error.
pub struct MockCompletion {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(fallback.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) -> &Self {
        self.script.lock().push_back(Ok(reply.into()));
        self
    }

    pub fn push_error(&self, err: CompletionError) -> &Self {
        self.script.lock().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().push(request);
        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| CompletionError::Request("scripted failure".to_string()))
    }
}
