//! Chunk storage: Qdrant integration and the text-level [`TextIndex`].

pub mod client;
pub mod error;
pub mod index;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;

#[cfg(test)]
mod tests;

pub use client::{QdrantClient, VectorDbClient};
pub use error::VectorDbError;
pub use index::{
    HitMetadata, IndexError, IndexHit, IndexedChunk, SemanticIndex, TextIndex, score_to_distance,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorDbClient, ScriptedIndex};
pub use model::{ChunkPayload, SearchResult, VectorPoint, cosine_similarity};
