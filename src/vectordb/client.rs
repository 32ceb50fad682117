use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::debug;

use super::error::VectorDbError;
use super::model::{
    ChunkPayload, PAYLOAD_DOC_ID, SearchResult, VectorPoint, payload_from_retrieved_point,
};

/// Page size used when scanning all chunks of a document.
const SCROLL_PAGE_SIZE: u32 = 256;

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantClient {
    client: Qdrant,
    url: String,
}

fn doc_filter(doc_id: u64) -> Filter {
    Filter::must([Condition::matches(PAYLOAD_DOC_ID, doc_id as i64)])
}

impl QdrantClient {
    /// Creates a client for `url`.
    pub async fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Creates a collection with cosine distance.
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Ensures a collection exists (creates it if missing).
    pub async fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let exists = self.client.collection_exists(name).await.map_err(|e| {
            VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })?;

        if !exists {
            self.create_collection(name, vector_size).await?;
        }

        Ok(())
    }

    /// Upserts points and waits until they are searchable.
    pub async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| PointStruct::new(p.id, p.vector, p.payload.to_qdrant_payload()))
            .collect();

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(collection, qdrant_points).wait(true),
            )
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Searches a collection by vector similarity, optionally within one document.
    pub async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter_id: Option<u64>,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        let mut search_builder =
            SearchPointsBuilder::new(collection, query, limit).with_payload(true);

        if let Some(doc_id) = doc_filter_id {
            search_builder = search_builder.filter(doc_filter(doc_id));
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        let results = search_result
            .result
            .into_iter()
            .filter_map(SearchResult::from_scored_point)
            .collect();

        Ok(results)
    }

    /// Reads every stored chunk of a document, ordered by chunk index.
    pub async fn scroll_document(
        &self,
        collection: &str,
        doc_id: u64,
    ) -> Result<Vec<ChunkPayload>, VectorDbError> {
        let mut chunks = Vec::new();
        let mut offset = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(collection)
                .filter(doc_filter(doc_id))
                .limit(SCROLL_PAGE_SIZE)
                .with_payload(true);
            if let Some(point_id) = offset.take() {
                builder = builder.offset(point_id);
            }

            let response =
                self.client
                    .scroll(builder)
                    .await
                    .map_err(|e| VectorDbError::SearchFailed {
                        collection: collection.to_string(),
                        message: e.to_string(),
                    })?;

            chunks.extend(
                response
                    .result
                    .into_iter()
                    .filter_map(payload_from_retrieved_point),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        chunks.sort_by_key(|c| c.chunk_index);
        debug!(collection, doc_id, chunks = chunks.len(), "Scrolled document");
        Ok(chunks)
    }

    /// Deletes every point belonging to a document.
    pub async fn delete_document(&self, collection: &str, doc_id: u64) -> Result<(), VectorDbError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(doc_filter(doc_id))
                    .wait(true),
            )
            .await
            .map_err(|e| VectorDbError::DeleteFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// Minimal async interface used by higher-level code.
pub trait VectorDbClient: Send + Sync {
    /// Ensures a collection exists.
    fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Upserts points; they are searchable once this resolves.
    fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Searches for similar points, best first.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<u64>,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, VectorDbError>> + Send;

    /// Returns every chunk stored for a document.
    fn scroll_document(
        &self,
        collection: &str,
        doc_id: u64,
    ) -> impl std::future::Future<Output = Result<Vec<ChunkPayload>, VectorDbError>> + Send;

    /// Removes every chunk stored for a document.
    fn delete_document(
        &self,
        collection: &str,
        doc_id: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;
}

impl VectorDbClient for QdrantClient {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.ensure_collection(name, vector_size).await
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        self.upsert_points(collection, points).await
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<u64>,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        self.search(collection, query, limit, doc_filter).await
    }

    async fn scroll_document(
        &self,
        collection: &str,
        doc_id: u64,
    ) -> Result<Vec<ChunkPayload>, VectorDbError> {
        self.scroll_document(collection, doc_id).await
    }

    async fn delete_document(&self, collection: &str, doc_id: u64) -> Result<(), VectorDbError> {
        self.delete_document(collection, doc_id).await
    }
}
