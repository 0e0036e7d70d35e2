pub mod greedy;
pub mod opcode;
pub mod sequence_matcher;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::types::{Token, WordHighlight};

pub use summary::AlignmentSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Order-insensitive matching with misspelling tolerance (dictation).
    Greedy,
    /// Longest-common-subsequence edit script (read-aloud, repeat-sentence).
    Opcode,
}

/// Word-level diff of a response against a reference.
///
/// Every reference token appears exactly once as correct, substituted,
/// misspelled or missing; every response token exactly once as correct,
/// substituted, misspelled or extra.
pub fn align(reference: &[Token], response: &[Token], mode: AlignmentMode) -> Vec<WordHighlight> {
    match mode {
        AlignmentMode::Greedy => greedy::align_greedy(reference, response),
        AlignmentMode::Opcode => opcode::align_opcode(reference, response),
    }
}
