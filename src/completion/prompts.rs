//! Prompt builders for the three judgment calls of a comparison.

use super::{CompletionRequest, PromptMessage};
use crate::constants::{FINAL_MAX_TOKENS, MACRO_MAX_TOKENS, MATCH_MAX_TOKENS};

const DISCOURSE_SYSTEM: &str = "You are an expert in comparing academic papers. Compare the two \
papers at the level of their overall framing: research objectives, methodology, and \
datasets or experimental subjects. Answer briefly. Give a verdict (collision / partial \
overlap / distinct) and justify it.";

const MATCH_SYSTEM: &str = "You are a concise academic plagiarism analyst. Compare two passages \
and return a brief verdict (at most 40 words) covering whether plagiarism is likely and why.";

const FINAL_SYSTEM: &str = "You are an experienced reviewer. Give a concise final verdict.";

/// Whole-document framing comparison of two opening excerpts.
pub fn discourse(target_intro: &str, source_intro: &str) -> CompletionRequest {
    let user = format!(
        "Abstract/introduction of the paper under review:\n{target_intro}\n\n\
         Abstract/introduction of the reference paper:\n{source_intro}\n\n\
         Give your verdict and the reasons for it."
    );
    CompletionRequest::new(
        vec![PromptMessage::system(DISCOURSE_SYSTEM), PromptMessage::user(user)],
        MACRO_MAX_TOKENS,
    )
}

/// Short originality judgment for one matched passage pair.
pub fn match_judgment(target_text: &str, source_text: &str) -> CompletionRequest {
    let user = format!(
        "Passage under review:\n{target_text}\n\n\
         Suspected source:\n{source_text}\n\n\
         Judge how similar they are and the likely form of copying. Keep it short."
    );
    CompletionRequest::new(
        vec![PromptMessage::system(MATCH_SYSTEM), PromptMessage::user(user)],
        MATCH_MAX_TOKENS,
    )
}

/// Robustness figures quoted in the final prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskFigures {
    pub avg_masked_score: f64,
    pub robust_hits: usize,
    pub total_hits: usize,
}

/// Combined verdict over the macro judgment and the match statistics.
pub fn final_opinion(
    macro_verdict: &str,
    macro_details: &str,
    match_count: usize,
    total_score: f64,
    mask: Option<MaskFigures>,
) -> CompletionRequest {
    let mask_line = mask
        .map(|m| {
            format!(
                "Masking robustness: avg {}%, robust_hits {}/{}.\n",
                m.avg_masked_score, m.robust_hits, m.total_hits
            )
        })
        .unwrap_or_default();

    let user = format!(
        "Macro analysis:\nverdict: {macro_verdict}\ndetails: {macro_details}\n\n\
         Passage-level hits: {match_count}, overall score: {total_score}%\n\
         {mask_line}\
         Give a short verdict (at most 60 words) stating whether there is a plagiarism risk \
         and the main evidence."
    );
    CompletionRequest::new(
        vec![PromptMessage::system(FINAL_SYSTEM), PromptMessage::user(user)],
        FINAL_MAX_TOKENS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::PromptRole;

    #[test]
    fn test_discourse_presents_both_excerpts() {
        let req = discourse("TARGET INTRO", "SOURCE INTRO");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, PromptRole::System);
        assert!(req.messages[1].content.contains("TARGET INTRO"));
        assert!(req.messages[1].content.contains("SOURCE INTRO"));
        assert_eq!(req.max_tokens, MACRO_MAX_TOKENS);
        assert!(req.temperature <= 0.3);
    }

    #[test]
    fn test_match_judgment_budget() {
        let req = match_judgment("a", "b");
        assert_eq!(req.max_tokens, MATCH_MAX_TOKENS);
        assert!(req.messages[1].content.contains("Suspected source:\nb"));
    }

    #[test]
    fn test_final_opinion_mask_line_optional() {
        let without = final_opinion("analysis complete", "same topic", 3, 42.5, None);
        assert!(!without.messages[1].content.contains("Masking robustness"));
        assert!(without.messages[1].content.contains("overall score: 42.5%"));

        let with = final_opinion(
            "analysis complete",
            "same topic",
            3,
            42.5,
            Some(MaskFigures {
                avg_masked_score: 88.1,
                robust_hits: 2,
                total_hits: 3,
            }),
        );
        assert!(with.messages[1].content.contains("robust_hits 2/3"));
        assert_eq!(with.max_tokens, FINAL_MAX_TOKENS);
    }
}
