//! Lexical content signals; none of these need an embedder.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::text::lexicon::{
    is_content_word, ARGUMENT_MARKERS, COMPLEX_CONNECTORS, CONCLUSION_MARKERS, SIMPLE_CONNECTORS,
};
use crate::text::{normalize, stem, words};

/// Weight applied to the copied-word ratio before it is reported.
pub const COPY_LENIENCY: f64 = 0.5;
const COPY_MIN_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReuseSignals {
    /// Share of response content words not lifted from the reference.
    pub paraphrase: f64,
    pub copying: f64,
}

pub fn reuse_signals(reference: &str, response: &str) -> ReuseSignals {
    let reference_words = words(reference);
    let response_words = words(response);

    let reference_content: HashSet<&str> = reference_words
        .iter()
        .map(String::as_str)
        .filter(|w| is_content_word(w))
        .collect();
    let response_content: HashSet<&str> = response_words
        .iter()
        .map(String::as_str)
        .filter(|w| is_content_word(w))
        .collect();
    let paraphrase = if response_content.is_empty() {
        0.0
    } else {
        let overlap = response_content.intersection(&reference_content).count();
        1.0 - overlap as f64 / response_content.len() as f64
    };

    let long = |list: &[String]| -> HashSet<String> {
        list.iter()
            .filter(|w| w.chars().count() > COPY_MIN_CHARS)
            .cloned()
            .collect()
    };
    let reference_long = long(&reference_words);
    let response_long = long(&response_words);
    let copying = if reference_long.is_empty() {
        0.0
    } else {
        let overlap = reference_long.intersection(&response_long).count();
        COPY_LENIENCY * overlap as f64 / reference_long.len() as f64
    };

    ReuseSignals {
        paraphrase,
        copying,
    }
}

/// Distinct simple connectors count once, distinct complex connectors twice.
pub fn connector_diversity(text: &str) -> f64 {
    let simple = SIMPLE_CONNECTORS.count_distinct(text);
    let complex = COMPLEX_CONNECTORS.count_distinct(text);
    (simple + 2 * complex) as f64
}

pub fn argument_markers(text: &str) -> usize {
    ARGUMENT_MARKERS.count_distinct(text)
}

pub fn conclusion_markers(text: &str) -> usize {
    CONCLUSION_MARKERS.count_distinct(text)
}

/// Number of `phrases` found in `text`, ignoring case and punctuation.
pub fn keyword_hits(text: &str, phrases: &[String]) -> usize {
    let haystack = format!(" {} ", normalize(text, true));
    phrases
        .iter()
        .map(|phrase| normalize(phrase, true))
        .filter(|phrase| !phrase.is_empty() && haystack.contains(&format!(" {phrase} ")))
        .count()
}

/// Most frequent content-word stems, ties broken by first occurrence.
pub fn key_terms(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (idx, word) in words(text).iter().enumerate() {
        if !is_content_word(word) || !word.chars().all(char::is_alphabetic) {
            continue;
        }
        let entry = counts.entry(stem(word)).or_insert((0, idx));
        entry.0 += 1;
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(limit).map(|(term, _)| term).collect()
}

/// Fraction of `terms` whose stem occurs among the response's words.
pub fn term_coverage(terms: &[String], response: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let response_stems: HashSet<String> = words(response).iter().map(|w| stem(w)).collect();
    let matched = terms.iter().filter(|term| response_stems.contains(*term)).count();
    matched as f64 / terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_copy_has_no_paraphrase() {
        let text = "Coral reefs protect coastlines from storms";
        let signals = reuse_signals(text, text);
        assert_eq!(signals.paraphrase, 0.0);
        // coral, reefs, protect, coastlines, storms: all copied
        assert!((signals.copying - COPY_LENIENCY).abs() < 1e-12);
    }

    #[test]
    fn paraphrase_shares_no_content_words() {
        let signals = reuse_signals(
            "Rising temperatures harm ecosystems",
            "Increasing heat damages natural environments",
        );
        assert_eq!(signals.paraphrase, 1.0);
        assert_eq!(signals.copying, 0.0);
    }

    #[test]
    fn empty_response_scores_zero() {
        let signals = reuse_signals("Some reference text", "");
        assert_eq!(signals.paraphrase, 0.0);
        assert_eq!(signals.copying, 0.0);
    }

    #[test]
    fn connectors_weight_complex_twice() {
        let text = "Prices rose and wages fell. However, demand held; moreover it grew, and grew.";
        // and (1) + however (2) + moreover (2)
        assert_eq!(connector_diversity(text), 5.0);
    }

    #[test]
    fn keyword_hits_match_whole_phrases() {
        let phrases = vec!["not ready".to_string(), "delay".to_string(), "go later".to_string()];
        assert_eq!(keyword_hits("I'm NOT ready, can we delay?", &phrases), 2);
        assert_eq!(keyword_hits("The delayed train", &phrases), 0);
    }

    #[test]
    fn key_terms_rank_by_frequency() {
        let terms = key_terms(
            "Glaciers retreat. Glaciers feed rivers. Rivers water farms and glaciers shape rivers.",
            2,
        );
        assert_eq!(terms, ["glacier", "river"]);
        assert_eq!(term_coverage(&terms, "the glacier is melting"), 0.5);
        assert_eq!(term_coverage(&[], "anything"), 0.0);
    }
}
