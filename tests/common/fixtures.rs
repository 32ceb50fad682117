//! Test fixtures for end-to-end pipeline tests.

use std::path::Path;
use std::sync::Arc;

use collide::chunking::Chunker;
use collide::completion::MockCompletion;
use collide::embedding::HashedEmbedder;
use collide::extract::StaticExtractor;
use collide::ingest::Ingestor;
use collide::orchestrator::TaskOrchestrator;
use collide::pipeline::{Comparator, PipelineConfig, RobustnessScorer};
use collide::store::MemoryStore;
use collide::vectordb::{MockVectorDbClient, SemanticIndex, TextIndex};

pub const COLLECTION: &str = "e2e_chunks";

pub const FIXED_SEED: u64 = 7;

/// Three pages on one topic, each longer than a single 500-character window.
pub fn survey_pages() -> Vec<String> {
    vec![
        "Urban traffic forecasting has moved from classical time series models toward \
         graph neural networks that treat road sensors as nodes and road segments as edges. \
         This survey organises recent work by how spatial dependencies are captured, \
         distinguishing spectral convolutions, diffusion processes and attention over \
         neighbouring sensors. We compare reported accuracy on the public loop detector \
         benchmarks and note that most gains come from better handling of sudden incidents \
         rather than from recurring rush hour patterns, which simple baselines already \
         predict well."
            .to_string(),
        "The second part examines temporal modelling. Recurrent encoders dominated early \
         systems, but dilated causal convolutions and transformer blocks now offer longer \
         receptive fields at lower training cost. We replicate five representative \
         architectures under a shared training budget and find that differences shrink \
         considerably once hyperparameters are tuned with equal effort. Missing sensor \
         readings remain a practical obstacle, and imputation strategies interact strongly \
         with the choice of temporal encoder."
            .to_string(),
        "Finally we discuss deployment. Forecasts feed signal timing, route guidance and \
         incident response, each with different latency and horizon requirements. Models \
         trained on one city transfer poorly to another unless the graph construction is \
         adapted, and we outline a checklist for practitioners covering data cleaning, \
         graph design, evaluation horizons and monitoring drift after release. Open \
         problems include calibrated uncertainty, fairness across neighbourhoods and \
         robustness to sensor outages."
            .to_string(),
    ]
}

/// Pages whose vocabulary shares nothing with [`survey_pages`].
pub fn unrelated_pages() -> Vec<String> {
    vec![
        "Medieval monastery ledgers preserve grain prices, tithe receipts plus harvest \
         failures spanning three centuries. Cellarers wrote entries in abbreviated Latin, \
         occasionally switching into vernacular when quoting peasants about disputed \
         boundaries. Comparing these books with manorial court rolls shows famine years \
         clustered around wet summers, yet monks rarely admitted shortages openly; instead \
         they recorded larger purchases of barley from distant markets."
            .to_string(),
    ]
}

/// A single page of exactly ten tokens, long enough to be ingested.
pub const TEN_TOKEN_PAGE: &str =
    "Photosynthetic bacteria colonise hydrothermal vents beneath Antarctic ice shelves unexpectedly";

pub struct TestPipeline {
    pub orchestrator: Arc<TaskOrchestrator>,
    pub ingestor: Ingestor,
    pub store: Arc<MemoryStore>,
    pub completion: Arc<MockCompletion>,
}

impl TestPipeline {
    /// Registers and ingests `path`, returning the document id.
    pub async fn ingested(&self, path: &str) -> u64 {
        let doc = self.ingestor.register(Path::new(path)).await;
        self.ingestor
            .ingest(doc.id)
            .await
            .expect("ingestion should succeed");
        doc.id
    }
}

pub struct PipelineBuilder {
    extractor: StaticExtractor,
    index: Option<Arc<dyn TextIndex>>,
    completion: MockCompletion,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            extractor: StaticExtractor::new(),
            index: None,
            completion: MockCompletion::new("Mock judgment."),
            config: PipelineConfig::default(),
        }
    }

    pub fn document<S: Into<String>>(
        mut self,
        path: &str,
        pages: impl IntoIterator<Item = S>,
    ) -> Self {
        self.extractor = self.extractor.with_document(path, pages);
        self
    }

    /// Uses this index instead of Qdrant mock + hashed embeddings.
    pub fn index(mut self, index: Arc<dyn TextIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn completion(mut self, completion: MockCompletion) -> Self {
        self.completion = completion;
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> TestPipeline {
        let index = match self.index {
            Some(index) => index,
            None => Arc::new(
                SemanticIndex::new(
                    MockVectorDbClient::new(),
                    Arc::new(HashedEmbedder::default()),
                    COLLECTION,
                )
                .await
                .expect("mock collection should be created"),
            ),
        };
        let extractor = Arc::new(self.extractor);
        let completion = Arc::new(self.completion);
        let store = Arc::new(MemoryStore::new());

        let robustness = RobustnessScorer::seeded(
            index.clone(),
            self.config.mask_runs,
            self.config.mask_ratio,
            FIXED_SEED,
        )
        .expect("valid mask ratio");
        let chunker = Chunker::new(self.config.chunk_window, self.config.chunk_overlap)
            .expect("valid chunk geometry");
        let comparator = Comparator::new(
            index.clone(),
            extractor.clone(),
            completion.clone(),
            self.config,
        )
        .expect("valid pipeline config")
        .with_robustness(robustness);

        TestPipeline {
            orchestrator: Arc::new(TaskOrchestrator::new(store.clone(), Arc::new(comparator))),
            ingestor: Ingestor::new(extractor, index, store.clone(), chunker),
            store,
            completion,
        }
    }
}
