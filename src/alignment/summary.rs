use serde::Serialize;

use crate::types::{HighlightStatus, WordHighlight};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AlignmentSummary {
    pub reference_len: usize,
    pub response_len: usize,
    pub correct: usize,
    pub substituted: usize,
    pub misspelled: usize,
    pub missing: usize,
    pub extra: usize,
    /// `correct / reference_len`; 0 for an empty reference.
    pub word_accuracy: f64,
    /// `(substituted + misspelled + missing + extra) / reference_len`.
    pub word_error_rate: f64,
}

impl AlignmentSummary {
    pub fn from_highlights(highlights: &[WordHighlight]) -> Self {
        let mut summary = Self::default();
        for highlight in highlights {
            match highlight.status {
                HighlightStatus::Correct => summary.correct += 1,
                HighlightStatus::Substituted => summary.substituted += 1,
                HighlightStatus::Misspelled => summary.misspelled += 1,
                HighlightStatus::Missing => summary.missing += 1,
                HighlightStatus::Extra => summary.extra += 1,
                HighlightStatus::Grammar | HighlightStatus::Spelling => {}
            }
        }
        summary.reference_len =
            summary.correct + summary.substituted + summary.misspelled + summary.missing;
        summary.response_len =
            summary.correct + summary.substituted + summary.misspelled + summary.extra;
        if summary.reference_len > 0 {
            let reference_len = summary.reference_len as f64;
            summary.word_accuracy = summary.correct as f64 / reference_len;
            summary.word_error_rate = (summary.substituted
                + summary.misspelled
                + summary.missing
                + summary.extra) as f64
                / reference_len;
        } else if summary.extra > 0 {
            summary.word_error_rate = 1.0;
        }
        summary
    }
}
