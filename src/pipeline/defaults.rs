use crate::error::ScoreError;
use crate::pipeline::traits::{Embedder, TextChecker};
use crate::text::lexicon::is_content_word;
use crate::text::{stem, words};
use crate::types::TextIssue;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(text: &str) -> u64 {
    text.bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

/// Deterministic feature-hashing embedder over stemmed content words.
///
/// Captures lexical overlap only; plug in a sentence-embedding model for
/// paraphrase-aware similarity.
#[derive(Debug, Clone, Copy)]
pub struct HashedBagOfWords {
    pub dimensions: usize,
}

impl HashedBagOfWords {
    pub const DEFAULT_DIMENSIONS: usize = 512;
}

impl Default for HashedBagOfWords {
    fn default() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }
}

impl Embedder for HashedBagOfWords {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ScoreError> {
        if self.dimensions == 0 {
            return Err(ScoreError::collaborator(
                "embedder",
                "hashed embedder needs at least one dimension",
            ));
        }
        let mut vector = vec![0.0f32; self.dimensions];
        for word in words(text).iter().filter(|w| is_content_word(w)) {
            let slot = (fnv1a(&stem(word)) % self.dimensions as u64) as usize;
            vector[slot] += 1.0;
        }
        Ok(vector)
    }
}

/// Reports no issues for any text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIssueChecker;

impl TextChecker for NoIssueChecker {
    fn check(&self, _text: &str) -> Result<Vec<TextIssue>, ScoreError> {
        Ok(Vec::new())
    }
}

/// Replays checker output captured elsewhere.
#[derive(Debug, Clone, Default)]
pub struct FixedIssueChecker {
    issues: Vec<TextIssue>,
}

impl FixedIssueChecker {
    pub fn new(issues: Vec<TextIssue>) -> Self {
        Self { issues }
    }
}

impl TextChecker for FixedIssueChecker {
    fn check(&self, _text: &str) -> Result<Vec<TextIssue>, ScoreError> {
        Ok(self.issues.clone())
    }
}
