//! The comparison pipeline.
//!
//! For one ordered document pair the [`Comparator`]:
//! 1. compares the opening pages of both documents ([`DiscourseComparator`]);
//! 2. walks the target's indexed chunks in order, re-windowed by the chunker;
//! 3. finds each window's nearest source chunk and classifies the distance
//!    ([`NearestMatchClassifier`]);
//! 4. asks the completion service to judge every match and re-scores it under
//!    masking ([`RobustnessScorer`]);
//! 5. folds everything into a [`Report`] ([`ReportAggregator`]).

mod classifier;
mod comparator;
mod config;
mod discourse;
mod error;
mod report;
mod robustness;


pub use classifier::{Candidate, MatchType, NearestMatchClassifier, classify};
pub use comparator::Comparator;
pub use config::PipelineConfig;
pub use discourse::{
    DETAILS_INSUFFICIENT, DiscourseComparator, MacroAnalysis, VERDICT_COMPLETE,
    VERDICT_INSUFFICIENT,
};
pub use error::PipelineError;
pub use report::{
    MaskCheck, MatchRecord, Report, ReportAggregator, Summary, Verdict, total_score, verdict,
};
pub use robustness::{RobustnessScorer, is_robust};
