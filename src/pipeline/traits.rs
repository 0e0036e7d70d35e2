use crate::error::ScoreError;
use crate::types::{AudioClip, RawAcoustics, TextIssue};

/// Turns audio into a transcript and low-level measurements.
pub trait SpeechFrontend: Send + Sync {
    fn transcribe(&self, clip: &AudioClip) -> Result<String, ScoreError>;

    fn extract_features(&self, clip: &AudioClip) -> Result<RawAcoustics, ScoreError>;
}

/// Sentence embedding model.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ScoreError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ScoreError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }
}

/// Grammar and spelling checker.
pub trait TextChecker: Send + Sync {
    fn check(&self, text: &str) -> Result<Vec<TextIssue>, ScoreError>;
}

/// Cosine of two vectors; 0 when either is all zeros or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}
