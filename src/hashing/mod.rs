//! BLAKE3-based identifiers.
//!
//! Qdrant point ids must be integers or UUIDs, so string chunk ids
//! (`doc_<id>_<index>`) are mapped onto a 64-bit space here. The original string
//! id is kept in the point payload.

use blake3::Hasher;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// With 64 bits, collisions stay negligible for the chunk counts of a single
/// collection (`P ≈ n² / 2^65`). A collision overwrites one chunk on upsert; it
/// never corrupts query results for other documents because every payload
/// carries its own `doc_id`.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Index-level chunk id, `doc_<id>_<index>`.
#[inline]
pub fn index_chunk_id(doc_id: u64, chunk_index: u64) -> String {
    format!("doc_{}_{}", doc_id, chunk_index)
}

/// Point id for a chunk, derived from its index-level id.
#[inline]
pub fn chunk_point_id(doc_id: u64, chunk_index: u64) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&doc_id.to_le_bytes());
    hasher.update(b"|");
    hasher.update(&chunk_index.to_le_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Bucket and sign for one token in a hashed feature vector of `dim` slots.
#[inline]
pub fn token_feature(token: &str, dim: usize) -> (usize, f32) {
    let hash = hash_to_u64(token.as_bytes());
    let bucket = (hash % dim.max(1) as u64) as usize;
    let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}
