use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::{distance_to_score, round2};
use crate::masking::{Masker, MaskingError};
use crate::vectordb::TextIndex;

/// Estimates how much a match depends on exact wording by re-querying the
/// index with masked variants of the matched text.
pub struct RobustnessScorer {
    index: Arc<dyn TextIndex>,
    runs: usize,
    ratio: f64,
    masker: Mutex<Masker>,
}

impl RobustnessScorer {
    pub fn new(index: Arc<dyn TextIndex>, runs: usize, ratio: f64) -> Result<Self, MaskingError> {
        let masker = Masker::new(ratio.max(0.0))?;
        Ok(Self::with_masker(index, runs, ratio, masker))
    }

    /// Reproducible trials.
    pub fn seeded(
        index: Arc<dyn TextIndex>,
        runs: usize,
        ratio: f64,
        seed: u64,
    ) -> Result<Self, MaskingError> {
        let masker = Masker::seeded(ratio.max(0.0), seed)?;
        Ok(Self::with_masker(index, runs, ratio, masker))
    }

    fn with_masker(index: Arc<dyn TextIndex>, runs: usize, ratio: f64, masker: Masker) -> Self {
        Self {
            index,
            runs,
            ratio,
            masker: Mutex::new(masker),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_enabled(&self) -> bool {
        self.runs > 0 && self.ratio > 0.0
    }

    /// Mean masked score over the trials that found a candidate, or `None`
    /// when disabled or when every trial came back empty.
    pub async fn score(&self, text: &str, source_doc_id: u64) -> Option<f64> {
        if !self.is_enabled() {
            return None;
        }

        let mut scores = Vec::with_capacity(self.runs);
        for trial in 0..self.runs {
            let masked = self.masker.lock().mask(text);
            match self.index.query(&masked, Some(source_doc_id), 1).await {
                Ok(hits) => {
                    if let Some(hit) = hits.first() {
                        scores.push(distance_to_score(hit.distance));
                    }
                }
                Err(e) => {
                    warn!(
                        source_doc_id,
                        trial,
                        error = %e,
                        "Masked query failed; discarding trial"
                    );
                }
            }
        }

        if scores.is_empty() {
            return None;
        }
        let mean = round2(scores.iter().sum::<f64>() / scores.len() as f64);
        debug!(source_doc_id, trials = scores.len(), mean, "Robustness scored");
        Some(mean)
    }
}

/// A match is robust when its masked score keeps at least `retention` of the original.
pub fn is_robust(masked_avg: f64, original_score: f64, retention: f64) -> bool {
    masked_avg >= original_score * retention
}
