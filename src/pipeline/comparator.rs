use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use super::classifier::NearestMatchClassifier;
use super::config::PipelineConfig;
use super::discourse::DiscourseComparator;
use super::error::PipelineError;
use super::report::{MatchRecord, Report, ReportAggregator};
use super::robustness::RobustnessScorer;
use crate::chunking::Chunker;
use crate::completion::{CompletionError, CompletionService, prompts};
use crate::config::ConfigError;
use crate::extract::TextExtractor;
use crate::store::Document;
use crate::vectordb::TextIndex;

/// Progress is logged after every this many stored target chunks.
const PROGRESS_EVERY: usize = 3;

/// One window of target text awaiting comparison.
#[derive(Debug, Clone)]
struct TargetWindow {
    page: u32,
    text: String,
    /// Position of the stored chunk this window came from.
    stored_index: usize,
    last_of_stored: bool,
}

/// Runs the full comparison of one ordered document pair.
pub struct Comparator {
    index: Arc<dyn TextIndex>,
    completion: Arc<dyn CompletionService>,
    config: PipelineConfig,
    chunker: Chunker,
    classifier: NearestMatchClassifier,
    robustness: RobustnessScorer,
    discourse: DiscourseComparator,
    aggregator: ReportAggregator,
}

impl Comparator {
    pub fn new(
        index: Arc<dyn TextIndex>,
        extractor: Arc<dyn TextExtractor>,
        completion: Arc<dyn CompletionService>,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let robustness = RobustnessScorer::new(index.clone(), config.mask_runs, config.mask_ratio)
            .map_err(|e| ConfigError::OutOfRange {
                name: "COLLIDE_MASK_RATIO",
                reason: e.to_string(),
            })?;

        Ok(Self {
            chunker: config.chunker()?,
            classifier: NearestMatchClassifier::new(
                index.clone(),
                config.verbatim_threshold,
                config.suspicious_threshold,
            ),
            discourse: DiscourseComparator::new(
                extractor,
                completion.clone(),
                config.intro_pages,
                config.intro_max_chars,
            ),
            aggregator: ReportAggregator::new(
                completion.clone(),
                config.high_risk_threshold,
                config.robust_retention,
                config.mask_runs,
                config.mask_ratio,
            ),
            robustness,
            index,
            completion,
            config,
        })
    }

    /// Replaces the robustness scorer (e.g. with a seeded one).
    pub fn with_robustness(mut self, robustness: RobustnessScorer) -> Self {
        self.robustness = robustness;
        self
    }

    /// Compares `target` against `source` and builds the report.
    pub async fn compare(
        &self,
        source: &Document,
        target: &Document,
    ) -> Result<Report, PipelineError> {
        info!(
            source_doc_id = source.id,
            target_doc_id = target.id,
            "Starting comparison"
        );

        let macro_analysis = self
            .discourse
            .compare(&target.file_path, &source.file_path)
            .await?;

        let (windows, stored) = self.target_windows(target.id).await?;
        let total_chunks = windows.len();

        let examined: Vec<Option<MatchRecord>> = stream::iter(windows)
            .map(|window| self.examine(window, source.id, stored))
            .buffered(self.config.judgment_concurrency)
            .try_collect()
            .await?;

        let mut matches: Vec<MatchRecord> = examined.into_iter().flatten().collect();
        for (id, record) in matches.iter_mut().enumerate() {
            record.id = id;
        }

        let report = self
            .aggregator
            .aggregate(macro_analysis, matches, total_chunks)
            .await?;

        info!(
            source_doc_id = source.id,
            target_doc_id = target.id,
            total_chunks,
            suspicious_chunks = report.summary.suspicious_chunks,
            score = report.summary.total_score,
            "Comparison finished"
        );
        Ok(report)
    }

    /// Target chunks re-windowed in document order, plus the stored chunk count.
    async fn target_windows(
        &self,
        target_doc_id: u64,
    ) -> Result<(Vec<TargetWindow>, usize), PipelineError> {
        let stored = self.index.document_chunks(target_doc_id).await?;
        if stored.is_empty() {
            return Err(PipelineError::NoTargetChunks(target_doc_id));
        }

        let mut windows = Vec::new();
        for (stored_index, chunk) in stored.iter().enumerate() {
            let pieces = self.chunker.split(&chunk.text);
            let last = pieces.len().saturating_sub(1);
            windows.extend(pieces.into_iter().enumerate().map(|(i, text)| TargetWindow {
                page: chunk.metadata.page,
                text,
                stored_index,
                last_of_stored: i == last,
            }));
        }
        Ok((windows, stored.len()))
    }

    /// Classifies one window and, when it matches, judges and stress-tests it.
    async fn examine(
        &self,
        window: TargetWindow,
        source_doc_id: u64,
        stored_total: usize,
    ) -> Result<Option<MatchRecord>, CompletionError> {
        let record = match self.classifier.evaluate(&window.text, source_doc_id).await {
            Some(candidate) => {
                let ai_analysis = self
                    .completion
                    .complete(prompts::match_judgment(&window.text, &candidate.source_text))
                    .await?;
                let masked_avg_score = self.robustness.score(&window.text, source_doc_id).await;
                debug!(
                    page = window.page,
                    score = candidate.score,
                    ?masked_avg_score,
                    "Match recorded"
                );

                Some(MatchRecord {
                    id: 0,
                    match_type: candidate.match_type,
                    score: candidate.score,
                    target_text: window.text,
                    target_page: window.page,
                    source_text: candidate.source_text,
                    source_page: candidate.source_page,
                    ai_analysis,
                    masked_avg_score,
                    mask_runs: self.robustness.runs(),
                    mask_ratio: self.robustness.ratio(),
                })
            }
            None => None,
        };

        if window.last_of_stored && window.stored_index % PROGRESS_EVERY == 0 {
            info!(
                processed = window.stored_index + 1,
                total = stored_total,
                "Processed target chunks"
            );
        }
        Ok(record)
    }
}
