//! `collide` command-line entrypoint.
//!
//! ```bash
//! OPENAI_API_KEY=... collide compare reference.pdf submission.pdf
//! ```
//!
//! Both PDFs are ingested into the configured Qdrant collection, compared, and
//! the resulting task payload is printed as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use collide::completion::{CompletionService, OpenAiCompletion};
use collide::config::Config;
use collide::embedding::{Embedder, HashedEmbedder, OpenAiEmbedder};
use collide::extract::{PdfExtractor, TextExtractor};
use collide::ingest::Ingestor;
use collide::orchestrator::{TaskOrchestrator, WorkerPool};
use collide::pipeline::{Comparator, PipelineConfig};
use collide::store::{ComparisonTask, MemoryStore, ProcessStatus};
use collide::vectordb::{QdrantClient, SemanticIndex, TextIndex};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "collide", version, about = "Detect textual overlap between two documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check `target` against `source` and print the report.
    Compare {
        /// Reference document.
        source: PathBuf,
        /// Document under review.
        target: PathBuf,
        /// Use the local hashed embedder instead of the embeddings API.
        #[arg(long)]
        hashed_embeddings: bool,
        /// Give up waiting for the task after this many seconds.
        #[arg(long, default_value_t = 900)]
        wait_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pipeline_config = PipelineConfig::from_env()?;

    match cli.command {
        Commands::Compare {
            source,
            target,
            hashed_embeddings,
            wait_secs,
        } => {
            compare(
                config,
                pipeline_config,
                source,
                target,
                hashed_embeddings,
                Duration::from_secs(wait_secs),
            )
            .await
        }
    }
}

async fn compare(
    config: Config,
    pipeline_config: PipelineConfig,
    source: PathBuf,
    target: PathBuf,
    hashed_embeddings: bool,
    wait: Duration,
) -> anyhow::Result<()> {
    let embedder: Arc<dyn Embedder> = if hashed_embeddings {
        tracing::warn!("Using hashed embeddings; similarity is lexical only");
        Arc::new(HashedEmbedder::default())
    } else {
        Arc::new(OpenAiEmbedder::from_config(&config))
    };

    let qdrant = QdrantClient::new(&config.qdrant_url).await?;
    qdrant.health_check().await?;
    tracing::info!(qdrant_url = %qdrant.url(), "Qdrant reachable");

    let semantic = SemanticIndex::new(qdrant, embedder, config.collection_name.clone()).await?;
    tracing::info!(
        collection = %semantic.collection(),
        model = %config.llm_model,
        "Collide starting"
    );
    let index: Arc<dyn TextIndex> = Arc::new(semantic);
    let completion: Arc<dyn CompletionService> = Arc::new(OpenAiCompletion::from_config(&config)?);
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfExtractor::new());

    // The collection is shared, so this run's document ids must not collide with others'.
    let store = Arc::new(MemoryStore::with_random_id_base());

    let ingestor = Ingestor::new(
        extractor.clone(),
        index.clone(),
        store.clone(),
        pipeline_config.chunker()?,
    );
    let comparator = Comparator::new(index.clone(), extractor, completion, pipeline_config)?;
    let orchestrator = Arc::new(TaskOrchestrator::new(store, Arc::new(comparator)));

    let finished = compare_and_clean(
        &index,
        &ingestor,
        orchestrator,
        config.workers,
        [&source, &target],
        wait,
    )
    .await?;
    let result = finished.result.unwrap_or(serde_json::Value::Null);
    println!("{}", serde_json::to_string_pretty(&result)?);

    match finished.status {
        ProcessStatus::Completed => Ok(()),
        status => anyhow::bail!("comparison task {} ended {}", finished.id, status),
    }
}

/// Runs one comparison, then removes both documents' chunks from the index.
///
/// Cleanup happens whatever the outcome. Its failures are logged and the
/// comparison outcome is returned unchanged.
async fn compare_and_clean(
    index: &Arc<dyn TextIndex>,
    ingestor: &Ingestor,
    orchestrator: Arc<TaskOrchestrator>,
    workers: usize,
    paths: [&PathBuf; 2],
    wait: Duration,
) -> anyhow::Result<ComparisonTask> {
    let mut doc_ids = Vec::with_capacity(2);
    let outcome = run_comparison(ingestor, orchestrator, workers, paths, wait, &mut doc_ids).await;

    for doc_id in &doc_ids {
        if let Err(e) = index.delete_document(*doc_id).await {
            tracing::warn!(doc_id, error = %e, "Failed to remove document chunks");
        }
    }
    outcome
}

/// Ingests both documents and runs one comparison task to its end.
///
/// Ids are pushed to `doc_ids` as soon as they are registered, so the caller
/// can remove their chunks even when a later step fails.
async fn run_comparison(
    ingestor: &Ingestor,
    orchestrator: Arc<TaskOrchestrator>,
    workers: usize,
    paths: [&PathBuf; 2],
    wait: Duration,
    doc_ids: &mut Vec<u64>,
) -> anyhow::Result<ComparisonTask> {
    for path in paths {
        let doc = ingestor.register(path).await;
        doc_ids.push(doc.id);
        ingestor.ingest(doc.id).await?;
    }

    let pool = WorkerPool::start(orchestrator.clone(), workers);
    let task = orchestrator.create_task(doc_ids[0], doc_ids[1]).await?;
    pool.submit(task.id)?;
    let finished = orchestrator
        .wait_for_terminal(task.id, POLL_INTERVAL, wait)
        .await?;
    pool.shutdown().await;
    Ok(finished)
}
