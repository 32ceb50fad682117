//! Text-level nearest-neighbour index over document chunks.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::model::{ChunkPayload, VectorPoint};
use super::{VectorDbClient, VectorDbError};
use crate::chunking::Chunk;
use crate::embedding::{Embedder, EmbeddingError};

/// Upper bound of a cosine distance.
pub const MAX_DISTANCE: f64 = 2.0;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// Metadata returned with every hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitMetadata {
    pub doc_id: u64,
    pub page: u32,
    pub chunk_index: u64,
    /// `doc_<id>_<index>`.
    pub chunk_id: String,
}

/// One query result. `distance` is in `[0, 2]`, 0 meaning identical.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub text: String,
    pub metadata: HitMetadata,
    pub distance: f64,
}

impl From<ChunkPayload> for HitMetadata {
    fn from(payload: ChunkPayload) -> Self {
        Self {
            doc_id: payload.doc_id,
            page: payload.page,
            chunk_index: payload.chunk_index,
            chunk_id: payload.chunk_id,
        }
    }
}

/// Stored chunk read back from the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedChunk {
    pub text: String,
    pub metadata: HitMetadata,
}

/// Chunk store with nearest-neighbour lookup scoped by document.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// Stores chunks; each is tagged with its owning document id.
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<(), IndexError>;

    /// Up to `k` hits ordered by ascending distance.
    async fn query(
        &self,
        text: &str,
        doc_filter: Option<u64>,
        k: usize,
    ) -> Result<Vec<IndexHit>, IndexError>;

    /// Every chunk of a document, in chunk-index order.
    async fn document_chunks(&self, doc_id: u64) -> Result<Vec<IndexedChunk>, IndexError>;

    async fn delete_document(&self, doc_id: u64) -> Result<(), IndexError>;
}

/// Similarity score to cosine distance, clamped to `[0, 2]`.
pub fn score_to_distance(score: f32) -> f64 {
    (1.0 - score as f64).clamp(0.0, MAX_DISTANCE)
}

/// [`TextIndex`] backed by an embedder and a vector database.
pub struct SemanticIndex<V: VectorDbClient> {
    db: V,
    embedder: Arc<dyn Embedder>,
    collection: String,
}

impl<V: VectorDbClient> SemanticIndex<V> {
    /// Creates the index, making sure the collection exists.
    pub async fn new(
        db: V,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Result<Self, IndexError> {
        let collection = collection.into();
        db.ensure_collection(&collection, embedder.dimension() as u64)
            .await?;
        Ok(Self {
            db,
            embedder,
            collection,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl<V: VectorDbClient> TextIndex for SemanticIndex<V> {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<(), IndexError> {
        if chunks.is_empty() {
            return Ok(());
        }

        // One embeddings request and one upsert per batch.
        let batch_size = self.embedder.max_batch_size().max(1);
        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            let points: Vec<VectorPoint> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| {
                    VectorPoint::new(
                        vector,
                        ChunkPayload::new(chunk.doc_id, chunk.chunk_index, chunk.page, &chunk.text),
                    )
                })
                .collect();
            self.db.upsert_points(&self.collection, points).await?;
        }

        info!(
            collection = %self.collection,
            doc_id = chunks[0].doc_id,
            chunks = chunks.len(),
            batch_size,
            "Indexed chunks"
        );
        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        doc_filter: Option<u64>,
        k: usize,
    ) -> Result<Vec<IndexHit>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(text).await?;
        let results = self
            .db
            .search(&self.collection, vector, k as u64, doc_filter)
            .await?;

        let mut hits: Vec<IndexHit> = results
            .into_iter()
            .map(|r| IndexHit {
                distance: score_to_distance(r.score),
                text: r.payload.text.clone(),
                metadata: r.payload.into(),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(?doc_filter, hits = hits.len(), "Index query");
        Ok(hits)
    }

    async fn document_chunks(&self, doc_id: u64) -> Result<Vec<IndexedChunk>, IndexError> {
        let chunks = self.db.scroll_document(&self.collection, doc_id).await?;
        Ok(chunks
            .into_iter()
            .map(|payload| IndexedChunk {
                text: payload.text.clone(),
                metadata: payload.into(),
            })
            .collect())
    }

    async fn delete_document(&self, doc_id: u64) -> Result<(), IndexError> {
        self.db.delete_document(&self.collection, doc_id).await?;
        info!(collection = %self.collection, doc_id, "Deleted document chunks");
        Ok(())
    }
}
