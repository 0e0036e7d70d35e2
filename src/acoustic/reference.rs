//! Pronunciation against a known script (read-aloud).

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::acoustic::{MAX_SCORE, MIN_SCORE};
use crate::alignment::{align, AlignmentMode, AlignmentSummary};
use crate::rubric::{RubricRule, RubricTable, Signal, SignalVector, Threshold};
use crate::text::{count_syllables, round2, tokenize};
use crate::types::AcousticFeatures;

const ACCURACY_WEIGHT: f64 = 0.5;
const SYLLABLE_WEIGHT: f64 = 0.3;
const LEVEL_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceReading {
    pub word_error_rate: f64,
    /// Percentage agreement of transcript and script syllable counts.
    pub syllable_accuracy: f64,
    pub level: u8,
    pub description: String,
    pub score: f64,
}

static REFERENCE_RUBRIC: Lazy<RubricTable> = Lazy::new(reference_table);

fn reference_table() -> RubricTable {
    RubricTable::builtin(
        vec![
            RubricRule::new(
                5,
                "Highly Proficient – All sounds clear; natural stress and connected speech.",
            )
            .require(Threshold::at_least(Signal::WordAccuracy, 0.95))
            .require(Threshold::at_least(Signal::SyllableAccuracy, 95.0))
            .require(Threshold::at_least(Signal::IntonationStd, 30.0)),
            RubricRule::new(
                4,
                "Advanced – Minor errors in stress or consonants but fully intelligible.",
            )
            .require(Threshold::at_least(Signal::WordAccuracy, 0.90))
            .require(Threshold::at_least(Signal::SyllableAccuracy, 90.0)),
            RubricRule::new(
                3,
                "Good – Some words unclear; occasional distortion or misplaced stress.",
            )
            .require(Threshold::at_least(Signal::WordAccuracy, 0.80))
            .require(Threshold::at_least(Signal::SyllableAccuracy, 80.0)),
            RubricRule::new(
                2,
                "Intermediate – Frequent mispronunciations; listener must adapt to accent.",
            )
            .require(Threshold::at_least(Signal::WordAccuracy, 0.65))
            .require(Threshold::at_least(Signal::SyllableAccuracy, 60.0)),
            RubricRule::new(
                1,
                "Intrusive – Strong accent; stress unclear; many sounds distorted or dropped.",
            )
            .require(Threshold::at_least(Signal::WordAccuracy, 0.40)),
        ],
        RubricRule::new(
            0,
            "Non-English – Mostly unintelligible; stress and sounds non-native.",
        ),
    )
}

pub fn syllable_accuracy(reference_syllables: u32, spoken_syllables: u32) -> f64 {
    if reference_syllables == 0 {
        return 0.0;
    }
    let gap = (reference_syllables as f64 - spoken_syllables as f64).abs();
    (1.0 - gap / reference_syllables as f64).max(0.0) * 100.0
}

/// Scores how closely the spoken transcript follows `reference`: word error
/// rate, syllable agreement and the resulting rubric level are blended into
/// one 10–90 pronunciation score.
pub fn score_reference_pronunciation(reference: &str, features: &AcousticFeatures) -> ReferenceReading {
    let highlights = align(
        &tokenize(reference),
        &tokenize(&features.transcript),
        AlignmentMode::Opcode,
    );
    let word_error_rate = AlignmentSummary::from_highlights(&highlights).word_error_rate;
    let syllable_accuracy =
        syllable_accuracy(count_syllables(reference), features.syllable_count);

    let word_accuracy = (1.0 - word_error_rate).max(0.0);
    let outcome = REFERENCE_RUBRIC.classify(
        &SignalVector::new()
            .with(Signal::WordAccuracy, word_accuracy)
            .with(Signal::SyllableAccuracy, syllable_accuracy)
            .with(Signal::IntonationStd, features.intonation_std),
    );

    let blended = word_accuracy * 100.0 * ACCURACY_WEIGHT
        + syllable_accuracy * SYLLABLE_WEIGHT
        + outcome.level as f64 / 5.0 * MAX_SCORE * LEVEL_WEIGHT;

    ReferenceReading {
        word_error_rate: round2(word_error_rate),
        syllable_accuracy: round2(syllable_accuracy),
        level: outcome.level,
        description: outcome.description,
        score: round2(blended).clamp(MIN_SCORE, MAX_SCORE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rubric_validates() {
        reference_table().validate().expect("reference rubric");
    }

    #[test]
    fn syllable_accuracy_is_symmetric_gap() {
        assert_eq!(syllable_accuracy(10, 10), 100.0);
        assert_eq!(syllable_accuracy(10, 8), 80.0);
        assert_eq!(syllable_accuracy(10, 12), 80.0);
        assert_eq!(syllable_accuracy(10, 40), 0.0);
        assert_eq!(syllable_accuracy(0, 5), 0.0);
    }

    #[test]
    fn perfect_reading_reaches_the_top_level() {
        let script = "Rivers shaped the growth of early cities";
        let features = AcousticFeatures::from_measurements(script, 3.0, 35.0);
        let reading = score_reference_pronunciation(script, &features);
        assert_eq!(reading.word_error_rate, 0.0);
        assert_eq!(reading.syllable_accuracy, 100.0);
        assert_eq!(reading.level, 5);
        // 50 + 30 + 18, clamped to the ceiling
        assert_eq!(reading.score, 90.0);
    }

    #[test]
    fn unrelated_reading_floors() {
        let features = AcousticFeatures::from_measurements("banana", 1.0, 5.0);
        let reading = score_reference_pronunciation("Rivers shaped the growth of early cities", &features);
        assert_eq!(reading.level, 0);
        assert!(reading.score >= 10.0);
    }
}
