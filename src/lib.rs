//! Collide library crate: document overlap detection.
//!
//! A comparison checks a *target* document against a *source* document on two
//! levels:
//!
//! - **Macro**: the opening pages of both documents are compared for shared
//!   objectives, methods and data ([`pipeline::DiscourseComparator`]).
//! - **Micro**: every target chunk is matched against the nearest source chunk
//!   in a vector index, classified as verbatim or paraphrasing, judged by an
//!   LLM, and re-scored under random masking to see whether the match survives
//!   rewording ([`pipeline::NearestMatchClassifier`],
//!   [`pipeline::RobustnessScorer`]).
//!
//! The findings are folded into a [`pipeline::Report`] with an overall score
//! and verdict. [`orchestrator::TaskOrchestrator`] drives one task through
//! `pending -> processing -> {completed, failed}` and
//! [`orchestrator::WorkerPool`] runs tasks in the background.
//!
//! ## External services
//! Every collaborator sits behind a trait so it can be swapped:
//! - [`vectordb::TextIndex`] (Qdrant + an [`embedding::Embedder`])
//! - [`completion::CompletionService`] (OpenAI-compatible chat API)
//! - [`extract::TextExtractor`] (PDF text)
//! - [`store::DocumentStore`] (document and task records)
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod chunking;
pub mod completion;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod extract;
pub mod hashing;
pub mod ingest;
pub mod masking;
pub mod orchestrator;
pub mod pipeline;
pub mod store;
pub mod vectordb;

pub use chunking::{Chunk, Chunker, ChunkingError};
pub use completion::{
    CompletionError, CompletionRequest, CompletionService, OpenAiCompletion, PromptMessage,
    PromptRole,
};
#[cfg(any(test, feature = "mock"))]
pub use completion::MockCompletion;
pub use config::{Config, ConfigError};
pub use embedding::{Embedder, EmbeddingError, HashedEmbedder, OpenAiEmbedder};
pub use extract::{ExtractError, PageText, PdfExtractor, TextExtractor};
#[cfg(any(test, feature = "mock"))]
pub use extract::StaticExtractor;
pub use ingest::{IngestError, Ingestor};
pub use masking::{Masker, MaskingError};
pub use orchestrator::{OrchestratorError, TaskOrchestrator, WorkerPool};
pub use pipeline::{
    Comparator, MacroAnalysis, MatchRecord, MatchType, PipelineConfig, PipelineError, Report,
    Verdict,
};
pub use store::{ComparisonTask, Document, DocumentStore, MemoryStore, ProcessStatus, StoreError};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::{MockVectorDbClient, ScriptedIndex};
pub use vectordb::{
    IndexError, IndexHit, QdrantClient, SemanticIndex, TextIndex, VectorDbClient, VectorDbError,
};
