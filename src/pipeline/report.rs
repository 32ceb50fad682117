use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::MatchType;
use super::discourse::MacroAnalysis;
use super::robustness::is_robust;
use crate::completion::prompts::{self, MaskFigures};
use crate::completion::{CompletionError, CompletionService};
use crate::constants::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Low Risk")]
    LowRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_score: f64,
    pub verdict: Verdict,
    pub total_chunks: usize,
    pub suspicious_chunks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: usize,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub score: f64,
    pub target_text: String,
    pub target_page: u32,
    pub source_text: String,
    pub source_page: u32,
    pub ai_analysis: String,
    pub masked_avg_score: Option<f64>,
    pub mask_runs: usize,
    pub mask_ratio: f64,
}

/// Robustness summary over the matches that produced a masked score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskCheck {
    pub runs: usize,
    pub ratio: f64,
    pub avg_masked_score: f64,
    pub robust_hits: usize,
    pub total_hits: usize,
}

/// The persisted result of a completed comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub macro_analysis: MacroAnalysis,
    pub matches: Vec<MatchRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_check: Option<MaskCheck>,
    pub final_opinion: String,
}

/// Percentage of examined chunks that matched; 0 when nothing was examined.
pub fn total_score(suspicious_chunks: usize, total_chunks: usize) -> f64 {
    if total_chunks == 0 {
        return 0.0;
    }
    round2(suspicious_chunks as f64 / total_chunks as f64 * 100.0)
}

/// "High Risk" strictly above the threshold.
pub fn verdict(total_score: f64, high_risk_threshold: f64) -> Verdict {
    if total_score > high_risk_threshold {
        Verdict::HighRisk
    } else {
        Verdict::LowRisk
    }
}

pub struct ReportAggregator {
    completion: Arc<dyn CompletionService>,
    high_risk_threshold: f64,
    robust_retention: f64,
    mask_runs: usize,
    mask_ratio: f64,
}

impl ReportAggregator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        high_risk_threshold: f64,
        robust_retention: f64,
        mask_runs: usize,
        mask_ratio: f64,
    ) -> Self {
        Self {
            completion,
            high_risk_threshold,
            robust_retention,
            mask_runs,
            mask_ratio,
        }
    }

    pub fn summarize(&self, suspicious_chunks: usize, total_chunks: usize) -> Summary {
        let total_score = total_score(suspicious_chunks, total_chunks);
        Summary {
            total_score,
            verdict: verdict(total_score, self.high_risk_threshold),
            total_chunks,
            suspicious_chunks,
        }
    }

    /// `None` unless at least one match carries a masked score.
    pub fn mask_check(&self, matches: &[MatchRecord]) -> Option<MaskCheck> {
        let scored: Vec<(f64, f64)> = matches
            .iter()
            .filter_map(|m| m.masked_avg_score.map(|masked| (masked, m.score)))
            .collect();
        if scored.is_empty() {
            return None;
        }

        let avg = scored.iter().map(|(masked, _)| masked).sum::<f64>() / scored.len() as f64;
        let robust_hits = scored
            .iter()
            .filter(|(masked, original)| is_robust(*masked, *original, self.robust_retention))
            .count();

        Some(MaskCheck {
            runs: self.mask_runs,
            ratio: self.mask_ratio,
            avg_masked_score: round2(avg),
            robust_hits,
            total_hits: scored.len(),
        })
    }

    /// Folds the findings into a report and asks for the final opinion.
    pub async fn aggregate(
        &self,
        macro_analysis: MacroAnalysis,
        matches: Vec<MatchRecord>,
        total_chunks: usize,
    ) -> Result<Report, CompletionError> {
        let summary = self.summarize(matches.len(), total_chunks);
        let mask_check = self.mask_check(&matches);

        let request = prompts::final_opinion(
            &macro_analysis.verdict,
            &macro_analysis.details,
            matches.len(),
            summary.total_score,
            mask_check.as_ref().map(|m| MaskFigures {
                avg_masked_score: m.avg_masked_score,
                robust_hits: m.robust_hits,
                total_hits: m.total_hits,
            }),
        );
        let final_opinion = self.completion.complete(request).await?;
        debug!(
            total_score = summary.total_score,
            matches = matches.len(),
            "Report aggregated"
        );

        Ok(Report {
            summary,
            macro_analysis,
            matches,
            mask_check,
            final_opinion,
        })
    }
}
