//! Cross-cutting policy constants.
//!
//! These are the defaults behind [`PipelineConfig`](crate::pipeline::PipelineConfig).
//! None of them is derived from data; they are carried as named, overridable policy.
//!
//! # Distance Scale
//!
//! The index reports cosine distance in `[0, 2]` (0 = identical). Similarity scores
//! are `(1 - distance) * 100`, so both thresholds must stay within `[0, 1]`.

/// Sliding-window size in characters.
pub const DEFAULT_CHUNK_WINDOW: usize = 500;

/// Characters shared by consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Distances strictly below this are verbatim copies.
pub const DEFAULT_VERBATIM_THRESHOLD: f64 = 0.1;

/// Distances strictly below this (and at or above the verbatim threshold) are paraphrases.
pub const DEFAULT_SUSPICIOUS_THRESHOLD: f64 = 0.4;

/// Masked re-query trials per match.
pub const DEFAULT_MASK_RUNS: usize = 3;

/// Per-unit redaction probability.
pub const DEFAULT_MASK_RATIO: f64 = 0.5;

/// Placeholder for a redacted whitespace token.
pub const MASK_TOKEN: &str = "[MASK]";

/// Placeholder for a redacted character (texts without whitespace).
pub const MASK_CHAR: char = '□';

/// A match is robust when its masked score keeps at least this share of the original.
pub const DEFAULT_ROBUST_RETENTION: f64 = 0.8;

/// Report verdict flips to "High Risk" strictly above this percentage.
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 20.0;

/// Leading pages used for the discourse-level comparison.
pub const DEFAULT_INTRO_PAGES: usize = 2;

/// Character budget for each discourse excerpt.
pub const DEFAULT_INTRO_MAX_CHARS: usize = 4000;

/// Pages with less trimmed text than this are skipped during ingestion.
pub const MIN_PAGE_CHARS: usize = 50;

/// Sampling temperature for every completion prompt.
pub const COMPLETION_TEMPERATURE: f32 = 0.2;

/// Token budget for the discourse-level verdict.
pub const MACRO_MAX_TOKENS: u32 = 220;

/// Token budget for a per-match judgment.
pub const MATCH_MAX_TOKENS: u32 = 120;

/// Token budget for the final opinion.
pub const FINAL_MAX_TOKENS: u32 = 80;

/// Rounds to two decimal places (scores and percentages in reports).
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts an index distance into a 0-100 similarity score.
#[inline]
pub fn distance_to_score(distance: f64) -> f64 {
    round2((1.0 - distance) * 100.0)
}
