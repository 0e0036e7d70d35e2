//! Embedding-backed signals: key ideas, synthesis and coherence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::pipeline::traits::Embedder;
use crate::text::lexicon::DISCOURSE_MARKERS;

pub const MAX_KEY_IDEAS: usize = 3;
/// A key idea counts as covered when some response sentence reaches this.
pub const COVERAGE_THRESHOLD: f64 = 0.6;
/// Similarity at which a response sentence is said to draw on a reference sentence.
pub const SYNTHESIS_THRESHOLD: f64 = 0.45;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyIdeaRanking {
    /// Sentences most similar to the rest of the reference.
    #[default]
    Salience,
    /// Sentences carrying discourse markers first, salience breaking ties.
    DiscourseMarkers,
}

/// Embeds each distinct text once per evaluation.
pub(crate) struct EmbeddingCache<'a> {
    embedder: &'a dyn Embedder,
    vectors: HashMap<String, Vec<f32>>,
}

impl<'a> EmbeddingCache<'a> {
    pub(crate) fn new(embedder: &'a dyn Embedder) -> Self {
        Self {
            embedder,
            vectors: HashMap::new(),
        }
    }

    fn vector(&mut self, text: &str) -> Result<Vec<f32>, ScoreError> {
        if let Some(vector) = self.vectors.get(text) {
            return Ok(vector.clone());
        }
        let vector = self.embedder.embed(text)?;
        self.vectors.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    /// Cosine-style similarity clamped to `[0, 1]`.
    pub(crate) fn similarity(&mut self, a: &str, b: &str) -> Result<f64, ScoreError> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        let sim = self.embedder.similarity(&va, &vb);
        Ok(if sim.is_finite() { sim.clamp(0.0, 1.0) } else { 0.0 })
    }

    /// Embeds every text not yet cached with a single batch call.
    pub(crate) fn prefetch<'t>(
        &mut self,
        texts: impl IntoIterator<Item = &'t String>,
    ) -> Result<(), ScoreError> {
        let mut missing: Vec<String> = texts
            .into_iter()
            .filter(|text| !self.vectors.contains_key(text.as_str()))
            .cloned()
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if missing.is_empty() {
            return Ok(());
        }
        let vectors = self.embedder.embed_batch(&missing)?;
        if vectors.len() != missing.len() {
            return Err(ScoreError::collaborator(
                "embedder",
                format!("batch returned {} vectors for {} texts", vectors.len(), missing.len()),
            ));
        }
        self.vectors.extend(missing.into_iter().zip(vectors));
        Ok(())
    }

    /// `rows × cols` similarity matrix.
    pub(crate) fn matrix(
        &mut self,
        rows: &[String],
        cols: &[String],
    ) -> Result<Vec<Vec<f64>>, ScoreError> {
        self.prefetch(rows.iter().chain(cols))?;
        rows.iter()
            .map(|row| {
                cols.iter()
                    .map(|col| self.similarity(row, col))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

pub(crate) fn salience(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    if n <= 1 {
        return vec![1.0; n];
    }
    matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let others: f64 = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, sim)| sim)
                .sum();
            others / (n - 1) as f64
        })
        .collect()
}

/// Picks up to [`MAX_KEY_IDEAS`] reference sentences, returned in text order.
pub(crate) fn select_key_ideas(
    sentences: &[String],
    ranking: KeyIdeaRanking,
    cache: &mut EmbeddingCache<'_>,
) -> Result<Vec<String>, ScoreError> {
    let k = MAX_KEY_IDEAS.min(sentences.len());
    if k == sentences.len() {
        return Ok(sentences.to_vec());
    }
    let scores = salience(&cache.matrix(sentences, sentences)?);
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|&a, &b| {
        let by_marker = match ranking {
            KeyIdeaRanking::Salience => std::cmp::Ordering::Equal,
            KeyIdeaRanking::DiscourseMarkers => DISCOURSE_MARKERS
                .count_distinct(&sentences[b])
                .cmp(&DISCOURSE_MARKERS.count_distinct(&sentences[a])),
        };
        by_marker
            .then(scores[b].total_cmp(&scores[a]))
            .then(a.cmp(&b))
    });
    let mut chosen: Vec<usize> = order.into_iter().take(k).collect();
    chosen.sort_unstable();
    Ok(chosen.into_iter().map(|idx| sentences[idx].clone()).collect())
}

/// Fraction of key ideas matched by some response sentence at
/// [`COVERAGE_THRESHOLD`] or better.
pub(crate) fn idea_coverage(
    key_ideas: &[String],
    response_sentences: &[String],
    cache: &mut EmbeddingCache<'_>,
) -> Result<f64, ScoreError> {
    if key_ideas.is_empty() || response_sentences.is_empty() {
        return Ok(0.0);
    }
    let matrix = cache.matrix(key_ideas, response_sentences)?;
    let covered = matrix
        .iter()
        .filter(|row| row.iter().any(|sim| *sim >= COVERAGE_THRESHOLD))
        .count();
    Ok(covered as f64 / key_ideas.len() as f64)
}

/// Fraction of response sentences that draw on at least two reference
/// sentences (or on the single one, for one-sentence references).
pub(crate) fn synthesis(
    reference_sentences: &[String],
    response_sentences: &[String],
    cache: &mut EmbeddingCache<'_>,
) -> Result<f64, ScoreError> {
    if reference_sentences.is_empty() || response_sentences.is_empty() {
        return Ok(0.0);
    }
    let required = reference_sentences.len().min(2);
    let matrix = cache.matrix(response_sentences, reference_sentences)?;
    let synthesizing = matrix
        .iter()
        .filter(|row| row.iter().filter(|sim| **sim >= SYNTHESIS_THRESHOLD).count() >= required)
        .count();
    Ok(synthesizing as f64 / response_sentences.len() as f64)
}

/// Mean pairwise similarity of response sentences; `None` below two sentences.
pub(crate) fn coherence(
    response_sentences: &[String],
    cache: &mut EmbeddingCache<'_>,
) -> Result<Option<f64>, ScoreError> {
    let n = response_sentences.len();
    if n < 2 {
        return Ok(None);
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in i + 1..n {
            total += cache.similarity(&response_sentences[i], &response_sentences[j])?;
            pairs += 1;
        }
    }
    Ok(Some(total / pairs as f64))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Embeds text as a bag of first letters; texts sharing initials are similar.
    pub(crate) struct InitialsEmbedder;

    impl Embedder for InitialsEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ScoreError> {
            let mut vector = vec![0.0f32; 26];
            for word in text.split_whitespace() {
                if let Some(c) = word.chars().next().filter(char::is_ascii_alphabetic) {
                    vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                }
            }
            Ok(vector)
        }
    }

    /// Every text maps to the same vector.
    pub(crate) struct ConstantEmbedder;

    impl Embedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoreError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Counts batch and single calls; vectors come from [`InitialsEmbedder`].
    #[derive(Default)]
    pub(crate) struct BatchCountingEmbedder {
        pub(crate) batches: AtomicUsize,
        pub(crate) singles: AtomicUsize,
    }

    impl Embedder for BatchCountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ScoreError> {
            self.singles.fetch_add(1, Ordering::SeqCst);
            InitialsEmbedder.embed(text)
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ScoreError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            texts.iter().map(|text| InitialsEmbedder.embed(text)).collect()
        }
    }

    /// Drops the last vector of every batch.
    pub(crate) struct ShortBatchEmbedder;

    impl Embedder for ShortBatchEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, ScoreError> {
            InitialsEmbedder.embed(text)
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ScoreError> {
            let mut vectors = texts
                .iter()
                .map(|text| self.embed(text))
                .collect::<Result<Vec<_>, _>>()?;
            vectors.pop();
            Ok(vectors)
        }
    }

    pub(crate) struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoreError> {
            Err(ScoreError::collaborator("embedder", "model unavailable"))
        }
    }
}
