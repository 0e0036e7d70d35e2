//! Content fidelity: how much of the reference the response carries.

pub mod group;
pub mod ideas;
pub mod signals;
pub mod tables;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::alignment::sequence_matcher::SequenceMatcher;
use crate::alignment::{align, AlignmentMode, AlignmentSummary};
use crate::dictation::score_dictation;
use crate::error::ScoreError;
use crate::pipeline::traits::Embedder;
use crate::rubric::{RubricTable, Signal, SignalVector};
use crate::text::{round2, split_sentences, tokenize, words};

pub use ideas::KeyIdeaRanking;

use ideas::EmbeddingCache;

pub const MIN_POINTS: f64 = 10.0;
pub const MAX_POINTS: f64 = 90.0;
/// Levels reported for strategies that produce a continuous 10–90 score.
pub const CONTINUOUS_MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ContentStrategy {
    /// Share of script words read correctly; below `min_accuracy` the score floors.
    WordAccuracy { min_accuracy: f64 },
    /// Matched-word share of the reference, as a 10–90 score.
    SequenceMatch,
    /// Key-term coverage blended with whole-text similarity.
    CoverageBlend {
        key_terms: usize,
        coverage_weight: f64,
        similarity_weight: f64,
    },
    /// Rubric cascade over the full signal vector.
    Cascade {
        table: RubricTable,
        #[serde(default)]
        key_ideas: KeyIdeaRanking,
    },
    /// Per-speaker coverage of a labelled discussion.
    GroupCoverage,
    /// One point per reference word written correctly.
    Dictation,
}

impl ContentStrategy {
    pub fn min_score(&self) -> f64 {
        match self {
            Self::Cascade { table, .. } => table.min_points(),
            Self::Dictation => 0.0,
            _ => MIN_POINTS,
        }
    }

    fn max_level(&self) -> u8 {
        match self {
            Self::Cascade { table, .. } => table.max_level(),
            _ => CONTINUOUS_MAX_LEVEL,
        }
    }

    fn needs_embedder(&self) -> bool {
        matches!(
            self,
            Self::CoverageBlend { .. } | Self::Cascade { .. } | Self::GroupCoverage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentAnalysis {
    pub similarity: f64,
    pub idea_coverage: f64,
    pub paraphrase_score: f64,
    pub copying_score: f64,
    pub connector_diversity: f64,
    pub synthesis_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coherence: Option<f64>,
    pub rubric_level: u8,
    pub max_level: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Content score on the exercise's reporting scale.
    pub score: f64,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ContentAnalysis {
    /// Lowest-band analysis, used when content cannot be assessed.
    pub fn floor(strategy: &ContentStrategy, reason: &str) -> Self {
        let (description, max_score) = match strategy {
            ContentStrategy::Cascade { table, .. } => {
                (table.floor_outcome().description, table.max_points())
            }
            _ => (String::new(), MAX_POINTS),
        };
        let mut extra = Map::new();
        extra.insert("error".to_string(), Value::String(reason.to_string()));
        Self {
            similarity: 0.0,
            idea_coverage: 0.0,
            paraphrase_score: 0.0,
            copying_score: 0.0,
            connector_diversity: 0.0,
            synthesis_score: 0.0,
            coherence: None,
            rubric_level: 0,
            max_level: strategy.max_level(),
            description,
            score: strategy.min_score(),
            max_score,
            extra,
        }
    }

    pub fn is_at_minimum(&self, strategy: &ContentStrategy) -> bool {
        self.score <= strategy.min_score()
    }

    fn lexical(reference: &str, response: &str, strategy: &ContentStrategy) -> Self {
        let reuse = signals::reuse_signals(reference, response);
        Self {
            similarity: 0.0,
            idea_coverage: 0.0,
            paraphrase_score: round2(reuse.paraphrase),
            copying_score: round2(reuse.copying),
            connector_diversity: signals::connector_diversity(response),
            synthesis_score: 0.0,
            coherence: None,
            rubric_level: 0,
            max_level: strategy.max_level(),
            description: String::new(),
            score: strategy.min_score(),
            max_score: MAX_POINTS,
            extra: Map::new(),
        }
    }
}

pub struct ContentContext<'a> {
    pub embedder: &'a dyn Embedder,
    /// Phrases counted by keyword-coverage rubrics.
    pub key_phrases: &'a [String],
}

/// Level on the 0–5 scale for a continuous 10–90 score.
pub fn continuous_level(score: f64) -> u8 {
    (((score - MIN_POINTS) / 16.0).floor().clamp(0.0, CONTINUOUS_MAX_LEVEL as f64)) as u8
}

fn scaled(fraction: f64) -> f64 {
    round2(MIN_POINTS + fraction.clamp(0.0, 1.0) * 80.0).clamp(MIN_POINTS, MAX_POINTS)
}

fn sentences_or_whole(text: &str) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() && !text.trim().is_empty() {
        vec![text.trim().to_string()]
    } else {
        sentences
    }
}

/// Scores how faithfully `response` carries the content of `reference`.
///
/// Embedder failures surface as errors; the caller decides how to degrade.
pub fn score_content(
    reference: &str,
    response: &str,
    strategy: &ContentStrategy,
    context: &ContentContext<'_>,
) -> Result<ContentAnalysis, ScoreError> {
    let mut analysis = ContentAnalysis::lexical(reference, response, strategy);
    if words(response).is_empty() {
        analysis.extra.insert("error".to_string(), json!("empty response"));
        return Ok(analysis);
    }

    let mut cache = EmbeddingCache::new(context.embedder);
    if strategy.needs_embedder() {
        analysis.similarity = round2(cache.similarity(reference, response)?);
    }

    match strategy {
        ContentStrategy::WordAccuracy { min_accuracy } => {
            let summary = AlignmentSummary::from_highlights(&align(
                &tokenize(reference),
                &tokenize(response),
                AlignmentMode::Opcode,
            ));
            let accuracy = summary.word_accuracy;
            analysis.similarity = round2(accuracy);
            analysis.score = if accuracy < *min_accuracy {
                MIN_POINTS
            } else {
                round2(accuracy * MAX_POINTS).clamp(MIN_POINTS, MAX_POINTS)
            };
            analysis.extra.insert("word_accuracy".to_string(), json!(round2(accuracy)));
            analysis.extra.insert("correct_words".to_string(), json!(summary.correct));
        }
        ContentStrategy::SequenceMatch => {
            let reference_words = words(reference);
            let response_words = words(response);
            let matched = SequenceMatcher::new(&reference_words, &response_words).matched_len();
            let fraction = if reference_words.is_empty() {
                0.0
            } else {
                matched as f64 / reference_words.len() as f64
            };
            analysis.similarity = round2(fraction);
            analysis.score = scaled(fraction);
            analysis.extra.insert("matched_words".to_string(), json!(matched));
        }
        ContentStrategy::CoverageBlend {
            key_terms,
            coverage_weight,
            similarity_weight,
        } => {
            let terms = signals::key_terms(reference, *key_terms);
            let coverage = signals::term_coverage(&terms, response);
            let blended = coverage * coverage_weight + analysis.similarity * similarity_weight;
            analysis.idea_coverage = round2(coverage);
            analysis.score = scaled(blended);
            analysis.extra.insert("key_terms".to_string(), json!(terms));
        }
        ContentStrategy::Cascade { table, key_ideas } => {
            let reference_sentences = sentences_or_whole(reference);
            let response_sentences = sentences_or_whole(response);
            let ideas = ideas::select_key_ideas(&reference_sentences, *key_ideas, &mut cache)?;
            analysis.idea_coverage =
                round2(ideas::idea_coverage(&ideas, &response_sentences, &mut cache)?);
            analysis.synthesis_score =
                round2(ideas::synthesis(&reference_sentences, &response_sentences, &mut cache)?);
            analysis.coherence = ideas::coherence(&response_sentences, &mut cache)?.map(round2);

            let signal_vector = cascade_signals(&analysis, response, context.key_phrases);
            let outcome = table.classify(&signal_vector);
            analysis.rubric_level = outcome.level;
            analysis.description = outcome.description;
            analysis.score = outcome.points;
            analysis.max_score = table.max_points();
            analysis.extra.insert("key_ideas".to_string(), json!(ideas));
            analysis.extra.insert("signals".to_string(), json!(signal_vector));
            return Ok(analysis);
        }
        ContentStrategy::GroupCoverage => {
            let speakers = group::parse_speakers(reference);
            if speakers.is_empty() {
                tracing::warn!("group transcript has no speaker labels; content floored");
                analysis
                    .extra
                    .insert("error".to_string(), json!("no speakers identified"));
                return Ok(analysis);
            }
            let coverage = group::score_group(&speakers, response, &mut cache)?;
            analysis.idea_coverage = round2(coverage.raw_idea_coverage / 4.0);
            analysis.paraphrase_score = coverage.paraphrase_depth;
            analysis.score = coverage.score;
            analysis.extra.insert("group".to_string(), json!(coverage));
        }
        ContentStrategy::Dictation => {
            let dictation = score_dictation(reference, response);
            analysis.similarity = round2(dictation.accuracy());
            analysis.score = dictation.score;
            analysis.max_score = dictation.max_score;
            analysis.rubric_level = continuous_level(scaled(dictation.accuracy()));
            analysis.extra.insert("dictation".to_string(), json!(dictation));
            return Ok(analysis);
        }
    }

    analysis.rubric_level = continuous_level(analysis.score);
    Ok(analysis)
}

fn cascade_signals(analysis: &ContentAnalysis, response: &str, key_phrases: &[String]) -> SignalVector {
    SignalVector::new()
        .with(Signal::Similarity, analysis.similarity)
        .with(Signal::IdeaCoverage, analysis.idea_coverage)
        .with(Signal::Paraphrase, analysis.paraphrase_score)
        .with(Signal::Originality, 1.0 - analysis.copying_score)
        .with(Signal::ConnectorDiversity, analysis.connector_diversity)
        .with(Signal::Synthesis, analysis.synthesis_score)
        .with(Signal::Coherence, analysis.coherence.unwrap_or(0.0))
        .with(Signal::WordCount, words(response).len() as f64)
        .with(
            Signal::KeywordHits,
            signals::keyword_hits(response, key_phrases) as f64,
        )
        .with(
            Signal::ArgumentMarkers,
            signals::argument_markers(response) as f64,
        )
        .with(
            Signal::ConclusionMarkers,
            signals::conclusion_markers(response) as f64,
        )
}
