use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rubric_rs::acoustic::{score_fluency, score_pronunciation, MAX_SCORE, MIN_SCORE};
use rubric_rs::alignment::{align, AlignmentMode, AlignmentSummary};
use rubric_rs::linguistic::{apply_penalties, IssueCounts, LinguisticScores};
use rubric_rs::text::tokenize;
use rubric_rs::AcousticFeatures;

const SEED: u64 = 42;
const ROUNDS: usize = 300;
const VOCAB: [&str; 12] = [
    "the", "river", "rivers", "city", "cities", "water", "trade", "route", "early", "food", "a",
    "watter",
];

fn sentence(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .filter_map(|_| VOCAB.choose(&mut *rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn every_token_is_accounted_for_exactly_once() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..ROUNDS {
        let reference = tokenize(&sentence(&mut rng, 12));
        let response = tokenize(&sentence(&mut rng, 12));
        for mode in [AlignmentMode::Greedy, AlignmentMode::Opcode] {
            let highlights = align(&reference, &response, mode);
            let summary = AlignmentSummary::from_highlights(&highlights);
            assert_eq!(summary.reference_len, reference.len(), "{mode:?} reference count");
            assert_eq!(summary.response_len, response.len(), "{mode:?} response count");
            assert_eq!(highlights.len(), reference.len() + summary.extra);
            assert!(summary.correct <= reference.len().min(response.len()));
        }
    }
}

#[test]
fn identical_sequences_align_perfectly() {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    for _ in 0..ROUNDS {
        let tokens = tokenize(&sentence(&mut rng, 10));
        for mode in [AlignmentMode::Greedy, AlignmentMode::Opcode] {
            let summary = AlignmentSummary::from_highlights(&align(&tokens, &tokens, mode));
            assert_eq!(summary.correct, tokens.len());
            assert_eq!(summary.extra + summary.missing + summary.substituted, 0);
        }
    }
}

#[test]
fn acoustic_scores_stay_in_band() {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    for _ in 0..ROUNDS {
        let features = AcousticFeatures {
            transcript: sentence(&mut rng, 30),
            duration_sec: rng.gen_range(0.0..120.0),
            speech_rate: rng.gen_range(0.0..20.0),
            intonation_std: rng.gen_range(0.0..500.0),
            syllable_count: rng.gen_range(0..400),
        };
        for score in [score_pronunciation(&features), score_fluency(&features)] {
            assert!(
                (MIN_SCORE..=MAX_SCORE).contains(&score),
                "score {score} out of band for {features:?}"
            );
        }
    }
}

#[test]
fn penalties_never_raise_or_go_negative() {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    for _ in 0..ROUNDS {
        let base = LinguisticScores {
            grammar: rng.gen_range(0..=2),
            spelling: rng.gen_range(0..=2),
            vocabulary: rng.gen_range(0..=2),
        };
        let counts = IssueCounts {
            grammar: rng.gen_range(0..12),
            spelling: rng.gen_range(0..12),
        };
        let (scores, _) = apply_penalties(base, counts);
        assert!(scores.grammar <= base.grammar);
        assert!(scores.spelling <= base.spelling);
        assert!(scores.vocabulary <= base.vocabulary);
        assert_eq!(apply_penalties(base, counts).0, scores);
    }
}
