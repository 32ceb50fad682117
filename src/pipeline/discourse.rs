use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::completion::{CompletionError, CompletionService, prompts};
use crate::extract::{TextExtractor, excerpt};

pub const VERDICT_INSUFFICIENT: &str = "insufficient information";
pub const DETAILS_INSUFFICIENT: &str = "missing abstract/introduction text";
pub const VERDICT_COMPLETE: &str = "analysis complete";

/// Document-level framing judgment. `details` is the service's text, unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroAnalysis {
    pub verdict: String,
    pub details: String,
}

impl MacroAnalysis {
    pub fn insufficient() -> Self {
        Self {
            verdict: VERDICT_INSUFFICIENT.to_string(),
            details: DETAILS_INSUFFICIENT.to_string(),
        }
    }
}

/// Compares the opening pages of two documents through the completion service.
pub struct DiscourseComparator {
    extractor: Arc<dyn TextExtractor>,
    completion: Arc<dyn CompletionService>,
    intro_pages: usize,
    intro_max_chars: usize,
}

impl DiscourseComparator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        completion: Arc<dyn CompletionService>,
        intro_pages: usize,
        intro_max_chars: usize,
    ) -> Self {
        Self {
            extractor,
            completion,
            intro_pages,
            intro_max_chars,
        }
    }

    /// Opening excerpt of a document; unreadable files give an empty excerpt.
    pub async fn intro(&self, path: &Path) -> String {
        match self.extractor.pages(path).await {
            Ok(pages) => excerpt(&pages, self.intro_pages, self.intro_max_chars),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Intro extraction failed");
                String::new()
            }
        }
    }

    /// Extracts both intros and compares them.
    pub async fn compare(
        &self,
        target_path: &Path,
        source_path: &Path,
    ) -> Result<MacroAnalysis, CompletionError> {
        let target_intro = self.intro(target_path).await;
        let source_intro = self.intro(source_path).await;
        self.compare_excerpts(&target_intro, &source_intro).await
    }

    /// Skips the service call when either excerpt is empty.
    pub async fn compare_excerpts(
        &self,
        target_intro: &str,
        source_intro: &str,
    ) -> Result<MacroAnalysis, CompletionError> {
        if target_intro.trim().is_empty() || source_intro.trim().is_empty() {
            info!("Discourse comparison skipped: missing intro text");
            return Ok(MacroAnalysis::insufficient());
        }

        let details = self
            .completion
            .complete(prompts::discourse(target_intro, source_intro))
            .await?;

        Ok(MacroAnalysis {
            verdict: VERDICT_COMPLETE.to_string(),
            details,
        })
    }
}
