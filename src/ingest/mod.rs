//! Document ingestion: extract pages, chunk them, index the chunks.


use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::constants::MIN_PAGE_CHARS;
use crate::extract::{ExtractError, TextExtractor};
use crate::store::{Document, DocumentStore, ProcessStatus, StoreError};
use crate::vectordb::{IndexError, TextIndex};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Moves a registered document from `pending` to `completed` by indexing its pages.
pub struct Ingestor {
    extractor: Arc<dyn TextExtractor>,
    index: Arc<dyn TextIndex>,
    store: Arc<dyn DocumentStore>,
    chunker: Chunker,
}

impl Ingestor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        index: Arc<dyn TextIndex>,
        store: Arc<dyn DocumentStore>,
        chunker: Chunker,
    ) -> Self {
        Self {
            extractor,
            index,
            store,
            chunker,
        }
    }

    /// Registers `path` as a new `pending` document.
    pub async fn register(&self, path: &Path) -> Document {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.store.create_document(&filename, path.to_path_buf()).await
    }

    /// Indexes a document and returns the number of chunks stored.
    ///
    /// Extraction and indexing failures leave the document `failed` with the
    /// error message recorded, and are returned to the caller.
    pub async fn ingest(&self, doc_id: u64) -> Result<usize, IngestError> {
        let document = self.store.document(doc_id).await?;
        self.store
            .set_document_status(doc_id, ProcessStatus::Processing, None)
            .await?;
        info!(doc_id, path = %document.file_path.display(), "Ingesting document");

        match self.index_pages(&document).await {
            Ok(count) => {
                self.store
                    .set_document_status(doc_id, ProcessStatus::Completed, None)
                    .await?;
                info!(doc_id, chunks = count, "Document ingested");
                Ok(count)
            }
            Err(e) => {
                error!(doc_id, error = %e, "Document ingestion failed");
                self.store
                    .set_document_status(doc_id, ProcessStatus::Failed, Some(e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn index_pages(&self, document: &Document) -> Result<usize, IngestError> {
        let pages = self.extractor.pages(&document.file_path).await?;
        let total_pages = pages.len();

        let kept: Vec<_> = pages
            .iter()
            .filter(|p| p.text.trim().chars().count() >= MIN_PAGE_CHARS)
            .collect();
        if kept.len() < total_pages {
            warn!(
                doc_id = document.id,
                skipped = total_pages - kept.len(),
                "Skipped near-empty pages"
            );
        }

        let chunks = self
            .chunker
            .chunk_pages(document.id, kept.iter().map(|p| (p.page, p.text.as_str())));
        self.index.insert_chunks(&chunks).await?;
        Ok(chunks.len())
    }
}
