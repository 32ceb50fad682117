use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{RetrievedPoint, ScoredPoint, Value};

use crate::hashing::{chunk_point_id, index_chunk_id};

pub(crate) const PAYLOAD_DOC_ID: &str = "doc_id";
pub(crate) const PAYLOAD_CHUNK_ID: &str = "chunk_id";
pub(crate) const PAYLOAD_CHUNK_INDEX: &str = "chunk_index";
pub(crate) const PAYLOAD_PAGE: &str = "page";
pub(crate) const PAYLOAD_TEXT: &str = "text";

/// Chunk metadata stored alongside every vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPayload {
    /// Owning document; every stored point carries it.
    pub doc_id: u64,
    /// Index-level id, `doc_<id>_<index>`.
    pub chunk_id: String,
    pub chunk_index: u64,
    pub page: u32,
    pub text: String,
}

impl ChunkPayload {
    pub fn new(doc_id: u64, chunk_index: u64, page: u32, text: impl Into<String>) -> Self {
        Self {
            doc_id,
            chunk_id: index_chunk_id(doc_id, chunk_index),
            chunk_index,
            page,
            text: text.into(),
        }
    }

    pub(crate) fn to_qdrant_payload(&self) -> HashMap<String, Value> {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert(PAYLOAD_DOC_ID.to_string(), (self.doc_id as i64).into());
        payload.insert(PAYLOAD_CHUNK_ID.to_string(), self.chunk_id.clone().into());
        payload.insert(
            PAYLOAD_CHUNK_INDEX.to_string(),
            (self.chunk_index as i64).into(),
        );
        payload.insert(PAYLOAD_PAGE.to_string(), (self.page as i64).into());
        payload.insert(PAYLOAD_TEXT.to_string(), self.text.clone().into());
        payload
    }

    pub(crate) fn from_qdrant_payload(payload: &HashMap<String, Value>) -> Option<Self> {
        let doc_id = payload.get(PAYLOAD_DOC_ID).and_then(|v| v.as_integer())? as u64;

        let chunk_index = payload
            .get(PAYLOAD_CHUNK_INDEX)
            .and_then(|v| v.as_integer())
            .map(|i| i as u64)
            .unwrap_or(0);

        let chunk_id = payload
            .get(PAYLOAD_CHUNK_ID)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| index_chunk_id(doc_id, chunk_index));

        let page = payload
            .get(PAYLOAD_PAGE)
            .and_then(|v| v.as_integer())
            .map(|i| i as u32)
            .unwrap_or(0);

        let text = payload
            .get(PAYLOAD_TEXT)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        Some(Self {
            doc_id,
            chunk_id,
            chunk_index,
            page,
            text,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl VectorPoint {
    pub fn new(vector: Vec<f32>, payload: ChunkPayload) -> Self {
        Self {
            id: chunk_point_id(payload.doc_id, payload.chunk_index),
            vector,
            payload,
        }
    }
}

/// One nearest-neighbour hit. `score` is cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    pub payload: ChunkPayload,
}

impl SearchResult {
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        Some(SearchResult {
            id,
            score: point.score,
            payload: ChunkPayload::from_qdrant_payload(&point.payload)?,
        })
    }
}

/// A stored point read back without scoring (document scans).
pub(crate) fn payload_from_retrieved_point(point: RetrievedPoint) -> Option<ChunkPayload> {
    ChunkPayload::from_qdrant_payload(&point.payload)
}

/// Cosine similarity; mismatched or zero-norm inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
