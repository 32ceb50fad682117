use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{ExtractError, PageText, TextExtractor};

/// Extracts page text from PDF files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_by_pages(&owned).map_err(|e| ExtractError::Parse {
                path: owned.clone(),
                reason: e.to_string(),
            })
        })
        .await
        .map_err(|e| ExtractError::Join(e.to_string()))??;

        debug!(path = %path.display(), pages = pages.len(), "Extracted PDF text");

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text))
            .collect())
    }
}
