use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::client::VectorDbClient;
use super::error::VectorDbError;
use super::index::{SemanticIndex, TextIndex, score_to_distance};
use super::mock::MockVectorDbClient;
use super::model::{ChunkPayload, VectorPoint, cosine_similarity};
use crate::chunking::Chunk;
use crate::embedding::{Embedder, EmbeddingError, HashedEmbedder};

const TEST_COLLECTION: &str = "test_collection";
const TEST_VECTOR_SIZE: u64 = 8;

fn unit_vector(hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; TEST_VECTOR_SIZE as usize];
    v[hot % TEST_VECTOR_SIZE as usize] = 1.0;
    v
}

fn point(doc_id: u64, chunk_index: u64, hot: usize) -> VectorPoint {
    VectorPoint::new(
        unit_vector(hot),
        ChunkPayload::new(doc_id, chunk_index, 1, format!("doc {doc_id} chunk {chunk_index}")),
    )
}

async fn seeded_client() -> MockVectorDbClient {
    let client = MockVectorDbClient::new();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    client
        .upsert_points(
            TEST_COLLECTION,
            vec![point(1, 0, 0), point(1, 1, 1), point(2, 0, 0)],
        )
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_ensure_collection_idempotent() {
    let client = MockVectorDbClient::new();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();
    assert_eq!(client.point_count(TEST_COLLECTION), Some(0));
}

#[tokio::test]
async fn test_upsert_into_missing_collection_fails() {
    let client = MockVectorDbClient::new();
    let err = client
        .upsert_points("missing", vec![point(1, 0, 0)])
        .await
        .unwrap_err();
    assert!(matches!(err, VectorDbError::CollectionNotFound { .. }));
}

#[tokio::test]
async fn test_upsert_rejects_wrong_dimension() {
    let client = MockVectorDbClient::new();
    client
        .ensure_collection(TEST_COLLECTION, TEST_VECTOR_SIZE)
        .await
        .unwrap();

    let bad = VectorPoint::new(vec![1.0; 3], ChunkPayload::new(1, 0, 1, "short"));
    let err = client
        .upsert_points(TEST_COLLECTION, vec![bad])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VectorDbError::InvalidDimension {
            expected: 8,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn test_upsert_same_chunk_overwrites() {
    let client = seeded_client().await;
    client
        .upsert_points(TEST_COLLECTION, vec![point(1, 0, 3)])
        .await
        .unwrap();
    assert_eq!(client.point_count(TEST_COLLECTION), Some(3));
}

#[tokio::test]
async fn test_search_respects_doc_filter() {
    let client = seeded_client().await;

    let results = client
        .search(TEST_COLLECTION, unit_vector(0), 10, Some(2))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].payload.doc_id, 2);

    let unfiltered = client
        .search(TEST_COLLECTION, unit_vector(0), 10, None)
        .await
        .unwrap();
    assert_eq!(unfiltered.len(), 3);
}

#[tokio::test]
async fn test_search_orders_best_first_and_truncates() {
    let client = seeded_client().await;
    let results = client
        .search(TEST_COLLECTION, unit_vector(1), 1, Some(1))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].payload.chunk_index, 1);
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_scroll_and_delete_document() {
    let client = seeded_client().await;

    let chunks = client.scroll_document(TEST_COLLECTION, 1).await.unwrap();
    let indices: Vec<u64> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(chunks[1].chunk_id, "doc_1_1");

    client.delete_document(TEST_COLLECTION, 1).await.unwrap();
    assert!(client.scroll_document(TEST_COLLECTION, 1).await.unwrap().is_empty());
    assert_eq!(client.point_count(TEST_COLLECTION), Some(1));
}

#[test]
fn test_payload_roundtrip_through_qdrant_values() {
    let payload = ChunkPayload::new(7, 3, 4, "some text");
    let restored = ChunkPayload::from_qdrant_payload(&payload.to_qdrant_payload()).unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn test_payload_without_doc_id_is_rejected() {
    let mut values = ChunkPayload::new(7, 3, 4, "x").to_qdrant_payload();
    values.remove("doc_id");
    assert!(ChunkPayload::from_qdrant_payload(&values).is_none());
}

#[test]
fn test_cosine_similarity_edge_cases() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
}

#[test]
fn test_score_to_distance_clamps() {
    assert_eq!(score_to_distance(1.0), 0.0);
    assert_eq!(score_to_distance(1.0001), 0.0);
    assert!((score_to_distance(0.25) - 0.75).abs() < 1e-6);
    assert_eq!(score_to_distance(-1.5), 2.0);
}

async fn semantic_index() -> SemanticIndex<MockVectorDbClient> {
    SemanticIndex::new(
        MockVectorDbClient::new(),
        Arc::new(HashedEmbedder::default()),
        TEST_COLLECTION,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_semantic_index_exact_text_has_zero_distance() {
    let index = semantic_index().await;
    index
        .insert_chunks(&[
            Chunk::new(1, 0, 1, "transformers for protein folding".to_string()),
            Chunk::new(1, 1, 2, "glacier melt in the alps".to_string()),
        ])
        .await
        .unwrap();

    let hits = index
        .query("glacier melt in the alps", Some(1), 2)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits[0].distance < 1e-5);
    assert_eq!(hits[0].metadata.page, 2);
    assert_eq!(hits[0].metadata.chunk_id, "doc_1_1");
    assert!(hits[0].distance <= hits[1].distance);
}

#[tokio::test]
async fn test_semantic_index_filter_excludes_other_documents() {
    let index = semantic_index().await;
    index
        .insert_chunks(&[Chunk::new(1, 0, 1, "shared sentence".to_string())])
        .await
        .unwrap();

    let hits = index.query("shared sentence", Some(2), 1).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_semantic_index_document_chunks_in_order() {
    let index = semantic_index().await;
    let chunks: Vec<Chunk> = (0..5)
        .rev()
        .map(|i| Chunk::new(9, i, 1, format!("chunk number {i}")))
        .collect();
    index.insert_chunks(&chunks).await.unwrap();

    let stored = index.document_chunks(9).await.unwrap();
    let texts: Vec<&str> = stored.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "chunk number 0",
            "chunk number 1",
            "chunk number 2",
            "chunk number 3",
            "chunk number 4"
        ]
    );

    index.delete_document(9).await.unwrap();
    assert!(index.document_chunks(9).await.unwrap().is_empty());
}

/// Hashed embedder that records request sizes and refuses oversized batches.
struct CountingEmbedder {
    inner: HashedEmbedder,
    limit: usize,
    calls: AtomicUsize,
    largest: AtomicUsize,
}

impl CountingEmbedder {
    fn new(limit: usize) -> Self {
        Self {
            inner: HashedEmbedder::new(TEST_VECTOR_SIZE as usize),
            limit,
            calls: AtomicUsize::new(0),
            largest: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn max_batch_size(&self) -> usize {
        self.limit
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.largest.fetch_max(texts.len(), Ordering::Relaxed);
        if texts.len() > self.limit {
            return Err(EmbeddingError::RequestFailed {
                reason: format!("{} inputs exceeds {}", texts.len(), self.limit),
            });
        }
        self.inner.embed_batch(texts).await
    }
}

#[tokio::test]
async fn test_insert_splits_large_documents_into_embedder_batches() {
    let embedder = Arc::new(CountingEmbedder::new(2048));
    let index = SemanticIndex::new(MockVectorDbClient::new(), embedder.clone(), TEST_COLLECTION)
        .await
        .unwrap();

    let chunks: Vec<Chunk> = (0..3000)
        .map(|i| Chunk::new(9, i, 1 + (i / 10) as u32, format!("chunk number {i}")))
        .collect();
    index.insert_chunks(&chunks).await.unwrap();

    assert_eq!(embedder.calls.load(Ordering::Relaxed), 2);
    assert_eq!(embedder.largest.load(Ordering::Relaxed), 2048);

    let stored = index.document_chunks(9).await.unwrap();
    assert_eq!(stored.len(), 3000);
    assert_eq!(stored[2999].text, "chunk number 2999");
    assert_eq!(stored[2048].metadata.chunk_index, 2048);
}
