//! Converts raw acoustic measurements into banded 10–90 scores.

pub mod disfluency;
pub mod reference;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::rubric::{RubricOutcome, RubricRule, RubricTable, Signal, SignalVector, Threshold};
use crate::text::{finite_or_zero, round2};
use crate::types::AcousticFeatures;

pub const MIN_SCORE: f64 = 10.0;
pub const MAX_SCORE: f64 = 90.0;

/// Speech rates (syllables/s) inside this band count as fluent.
pub const FLUENT_RATE_MIN: f64 = 2.5;
pub const FLUENT_RATE_MAX: f64 = 4.0;

const DENSITY_EPSILON: f64 = 1e-5;

/// Power-law mapping from a clamped speech rate onto `[10, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    pub min_rate: f64,
    pub max_rate: f64,
    pub exponent: f64,
}

impl RateCurve {
    pub fn scale(&self, rate: f64) -> f64 {
        let span = self.max_rate - self.min_rate;
        if span <= 0.0 {
            return MIN_SCORE;
        }
        let clamped = finite_or_zero(rate).clamp(self.min_rate, self.max_rate);
        MIN_SCORE + ((clamped - self.min_rate) / span).powf(self.exponent) * 80.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcousticCurve {
    pub rate: RateCurve,
    /// Multiplier applied to syllables per second for the density sub-score.
    pub syllable_factor: f64,
    /// The averaged sub-scores are multiplied by this before clamping.
    pub output_scale: f64,
}

impl AcousticCurve {
    pub const PRONUNCIATION: AcousticCurve = AcousticCurve {
        rate: RateCurve {
            min_rate: 1.5,
            max_rate: 5.0,
            exponent: 2.0,
        },
        syllable_factor: 10.0,
        output_scale: 0.9,
    };

    pub const FLUENCY: AcousticCurve = AcousticCurve {
        rate: RateCurve {
            min_rate: 1.0,
            max_rate: 5.0,
            exponent: 1.5,
        },
        syllable_factor: 15.0,
        output_scale: 1.0,
    };

    pub fn score(&self, features: &AcousticFeatures) -> AcousticBreakdown {
        let rate_score = self.rate.scale(features.speech_rate);
        let intonation_score = (finite_or_zero(features.intonation_std).max(0.0) * 2.0).min(MAX_SCORE);
        let duration = finite_or_zero(features.duration_sec).max(0.0);
        let syllable_score = (features.syllable_count as f64 / (duration + DENSITY_EPSILON)
            * self.syllable_factor)
            .min(MAX_SCORE);
        let raw_average = (rate_score + intonation_score + syllable_score) / 3.0;
        let score = round2(raw_average * self.output_scale).clamp(MIN_SCORE, MAX_SCORE);
        AcousticBreakdown {
            rate_score: round2(rate_score),
            intonation_score: round2(intonation_score),
            syllable_score: round2(syllable_score),
            raw_average: round2(raw_average),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcousticBreakdown {
    pub rate_score: f64,
    pub intonation_score: f64,
    pub syllable_score: f64,
    pub raw_average: f64,
    pub score: f64,
}

pub fn score_pronunciation(features: &AcousticFeatures) -> f64 {
    AcousticCurve::PRONUNCIATION.score(features).score
}

pub fn score_fluency(features: &AcousticFeatures) -> f64 {
    AcousticCurve::FLUENCY.score(features).score
}

pub(crate) fn is_fluent_rate(rate: f64) -> bool {
    (FLUENT_RATE_MIN..=FLUENT_RATE_MAX).contains(&rate)
}

pub fn acoustic_signals(features: &AcousticFeatures) -> SignalVector {
    SignalVector::new()
        .with(Signal::WordCount, features.word_count() as f64)
        .with(Signal::SyllableCount, features.syllable_count as f64)
        .with(Signal::IntonationStd, features.intonation_std)
        .with(
            Signal::FluentRate,
            if is_fluent_rate(features.speech_rate) { 1.0 } else { 0.0 },
        )
}

static REFERENCE_FREE_RUBRIC: Lazy<RubricTable> = Lazy::new(reference_free_table);

fn reference_free_table() -> RubricTable {
    RubricTable::builtin(
        vec![
            RubricRule::new(
                5,
                "Highly Proficient – All vowels and consonants are produced clearly. Natural assimilation/deletion and accurate stress.",
            )
            .require(Threshold::above(Signal::WordCount, 15.0))
            .require(Threshold::above(Signal::SyllableCount, 20.0))
            .require(Threshold::at_least(Signal::FluentRate, 1.0))
            .require(Threshold::at_least(Signal::IntonationStd, 30.0)),
            RubricRule::new(
                4,
                "Advanced – Minor distortions; good clarity. Stress mostly accurate; speech is clear and well-paced.",
            )
            .require(Threshold::above(Signal::WordCount, 12.0))
            .require(Threshold::above(Signal::SyllableCount, 15.0))
            .require(Threshold::at_least(Signal::IntonationStd, 20.0)),
            RubricRule::new(
                3,
                "Good – Some unclear words or flat pitch. Stress errors or missing syllables occur occasionally.",
            )
            .require(Threshold::above(Signal::WordCount, 9.0))
            .require(Threshold::above(Signal::SyllableCount, 12.0))
            .require(Threshold::at_least(Signal::IntonationStd, 15.0)),
            RubricRule::new(
                2,
                "Intermediate – Many mispronunciations. Accent affects clarity. Stress and sequences may be incorrect.",
            )
            .require(Threshold::above(Signal::WordCount, 5.0))
            .require(Threshold::above(Signal::SyllableCount, 8.0))
            .require(Threshold::at_least(Signal::IntonationStd, 10.0)),
            RubricRule::new(
                1,
                "Intrusive – Strong accent; stress unclear; many sounds distorted or dropped.",
            )
            .require(Threshold::above(Signal::WordCount, 2.0))
            .require(Threshold::above(Signal::SyllableCount, 4.0)),
        ],
        RubricRule::new(
            0,
            "Non-English – Mostly unintelligible; many words mispronounced or omitted.",
        ),
    )
}

/// Reference-free proficiency level (0..=5) with its description.
pub fn rubric_level(features: &AcousticFeatures) -> RubricOutcome {
    REFERENCE_FREE_RUBRIC.classify(&acoustic_signals(features))
}
