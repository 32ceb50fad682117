use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::chunking::Chunk;
use crate::vectordb::model::{ChunkPayload, cosine_similarity};
use crate::vectordb::{
    HitMetadata, IndexError, IndexHit, IndexedChunk, SearchResult, TextIndex, VectorDbClient,
    VectorDbError, VectorPoint,
};

/// In-memory stand-in for Qdrant with brute-force cosine search.
#[derive(Default)]
pub struct MockVectorDbClient {
    collections: std::sync::RwLock<HashMap<String, MockCollection>>,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, MockStoredPoint>,
}

#[derive(Clone)]
struct MockStoredPoint {
    vector: Vec<f32>,
    payload: ChunkPayload,
}

impl MockVectorDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }
}

impl VectorDbClient for MockVectorDbClient {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        collections
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                points: HashMap::new(),
            });

        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::UpsertFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }

            coll.points.insert(
                point.id,
                MockStoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<u64>,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        let mut results: Vec<SearchResult> = coll
            .points
            .iter()
            .filter(|(_, p)| doc_filter.is_none() || doc_filter == Some(p.payload.doc_id))
            .map(|(&id, p)| SearchResult {
                id,
                score: cosine_similarity(&query, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();

        // Ties resolve by chunk order so repeated runs agree.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.payload.doc_id.cmp(&b.payload.doc_id))
                .then(a.payload.chunk_index.cmp(&b.payload.chunk_index))
        });

        results.truncate(limit as usize);
        Ok(results)
    }

    async fn scroll_document(
        &self,
        collection: &str,
        doc_id: u64,
    ) -> Result<Vec<ChunkPayload>, VectorDbError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        let mut chunks: Vec<ChunkPayload> = coll
            .points
            .values()
            .filter(|p| p.payload.doc_id == doc_id)
            .map(|p| p.payload.clone())
            .collect();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    async fn delete_document(&self, collection: &str, doc_id: u64) -> Result<(), VectorDbError> {
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::DeleteFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        coll.points.retain(|_, p| p.payload.doc_id != doc_id);
        Ok(())
    }
}

/// [`TextIndex`] fake that answers every query with one scripted hit.
///
/// Inserted chunks are kept so `document_chunks` works; the query filter is
/// ignored.
#[derive(Default)]
pub struct ScriptedIndex {
    chunks: parking_lot::Mutex<Vec<Chunk>>,
    hit: Option<IndexHit>,
    fail_queries: bool,
    queries: AtomicUsize,
}

impl ScriptedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query returns this hit.
    pub fn with_hit(mut self, text: impl Into<String>, page: u32, distance: f64) -> Self {
        self.hit = Some(IndexHit {
            text: text.into(),
            metadata: HitMetadata {
                doc_id: 0,
                page,
                chunk_index: 0,
                chunk_id: "doc_0_0".to_string(),
            },
            distance,
        });
        self
    }

    /// Every query fails.
    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextIndex for ScriptedIndex {
    async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<(), IndexError> {
        self.chunks.lock().extend_from_slice(chunks);
        Ok(())
    }

    async fn query(
        &self,
        _text: &str,
        _doc_filter: Option<u64>,
        k: usize,
    ) -> Result<Vec<IndexHit>, IndexError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if self.fail_queries {
            return Err(IndexError::VectorDb(VectorDbError::SearchFailed {
                collection: "scripted".to_string(),
                message: "scripted failure".to_string(),
            }));
        }
        Ok(self.hit.iter().take(k).cloned().collect())
    }

    async fn document_chunks(&self, doc_id: u64) -> Result<Vec<IndexedChunk>, IndexError> {
        let mut chunks: Vec<Chunk> = self
            .chunks
            .lock()
            .iter()
            .filter(|c| c.doc_id == doc_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks
            .into_iter()
            .map(|c| IndexedChunk {
                metadata: HitMetadata {
                    doc_id: c.doc_id,
                    page: c.page,
                    chunk_index: c.chunk_index,
                    chunk_id: crate::hashing::index_chunk_id(c.doc_id, c.chunk_index),
                },
                text: c.text,
            })
            .collect())
    }

    async fn delete_document(&self, doc_id: u64) -> Result<(), IndexError> {
        self.chunks.lock().retain(|c| c.doc_id != doc_id);
        Ok(())
    }
}
