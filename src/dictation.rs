//! Write-from-dictation scoring: one point per reference word written
//! exactly, with half-point deductions for sentence form.

use std::collections::HashMap;

use serde::Serialize;

use crate::alignment::{align, AlignmentMode, AlignmentSummary};
use crate::text::{normalize_word, tokenize};
use crate::types::Token;

const FORM_DEDUCTION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictationScore {
    pub matched_words: usize,
    pub misspelled_words: usize,
    pub missing_words: usize,
    pub extra_words: usize,
    pub starts_capitalized: bool,
    pub ends_with_period: bool,
    pub score: f64,
    pub max_score: f64,
}

impl DictationScore {
    /// Share of reference words written exactly.
    pub fn accuracy(&self) -> f64 {
        if self.max_score > 0.0 {
            self.matched_words as f64 / self.max_score
        } else {
            0.0
        }
    }
}

/// Response words that equal some reference word, each reference word
/// usable as many times as it occurs. Position plays no part.
fn exact_matches(reference: &[Token], response: &[Token]) -> usize {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for token in reference {
        *remaining.entry(token.normalized.as_str()).or_default() += 1;
    }
    response
        .iter()
        .filter(|token| match remaining.get_mut(token.normalized.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count()
}

/// Scores a dictation. The greedy alignment only feeds the misspelled,
/// missing and extra counts; points come from exact matches.
pub fn score_dictation(reference: &str, response: &str) -> DictationScore {
    let reference_tokens = tokenize(reference);
    let response_tokens = tokenize(response);
    let summary = AlignmentSummary::from_highlights(&align(
        &reference_tokens,
        &response_tokens,
        AlignmentMode::Greedy,
    ));
    let matched_words = exact_matches(&reference_tokens, &response_tokens);

    let response_words: Vec<&str> = response.split_whitespace().collect();
    let starts_capitalized = response_words
        .first()
        .and_then(|word| word.chars().next())
        .map_or(true, char::is_uppercase);
    let ends_with_period = response_words
        .last()
        .map_or(true, |word| normalize_word(word, false).ends_with('.'));

    let max_score = reference_tokens.len() as f64;
    let mut score = matched_words as f64;
    if !starts_capitalized {
        score -= FORM_DEDUCTION;
    }
    if !ends_with_period {
        score -= FORM_DEDUCTION;
    }

    DictationScore {
        matched_words,
        misspelled_words: summary.misspelled,
        missing_words: summary.missing,
        extra_words: summary.extra,
        starts_capitalized,
        ends_with_period,
        score: score.clamp(0.0, max_score),
        max_score,
    }
}
