use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::distance_to_score;
use crate::vectordb::{IndexHit, TextIndex};

/// How closely a target chunk reproduces its nearest source chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Verbatim,
    Paraphrasing,
}

/// `d < verbatim` is verbatim, `verbatim <= d < suspicious` is paraphrasing,
/// anything else is not a match.
pub fn classify(
    distance: f64,
    verbatim_threshold: f64,
    suspicious_threshold: f64,
) -> Option<MatchType> {
    if distance < verbatim_threshold {
        Some(MatchType::Verbatim)
    } else if distance < suspicious_threshold {
        Some(MatchType::Paraphrasing)
    } else {
        None
    }
}

/// A target chunk whose nearest source chunk qualified as a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub match_type: MatchType,
    pub distance: f64,
    /// `round((1 - d) * 100, 2)`.
    pub score: f64,
    pub source_text: String,
    pub source_page: u32,
}

pub struct NearestMatchClassifier {
    index: Arc<dyn TextIndex>,
    verbatim_threshold: f64,
    suspicious_threshold: f64,
}

impl NearestMatchClassifier {
    pub fn new(
        index: Arc<dyn TextIndex>,
        verbatim_threshold: f64,
        suspicious_threshold: f64,
    ) -> Self {
        Self {
            index,
            verbatim_threshold,
            suspicious_threshold,
        }
    }

    /// Closest chunk of `source_doc_id`. Query failures count as "no candidate".
    pub async fn nearest(&self, text: &str, source_doc_id: u64) -> Option<IndexHit> {
        match self.index.query(text, Some(source_doc_id), 1).await {
            Ok(hits) => hits.into_iter().next(),
            Err(e) => {
                warn!(
                    source_doc_id,
                    error = %e,
                    "Nearest-neighbour query failed; skipping chunk"
                );
                None
            }
        }
    }

    /// Queries the index once and classifies the closest hit.
    pub async fn evaluate(&self, text: &str, source_doc_id: u64) -> Option<Candidate> {
        let hit = self.nearest(text, source_doc_id).await?;
        let match_type = classify(
            hit.distance,
            self.verbatim_threshold,
            self.suspicious_threshold,
        );
        debug!(
            source_doc_id,
            distance = hit.distance,
            ?match_type,
            "Classified chunk"
        );

        Some(Candidate {
            match_type: match_type?,
            distance: hit.distance,
            score: distance_to_score(hit.distance),
            source_text: hit.text,
            source_page: hit.metadata.page,
        })
    }
}
