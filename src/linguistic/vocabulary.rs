//! Vocabulary range: lexical diversity bands and the lexical-profile model.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::text::lexicon::{
    cefr_band, frequency_band, is_academic, CefrBand, FrequencyBand, ACADEMIC_SUFFIXES,
    CONTRACTIONS, INFORMAL_WORDS, VAGUE_WORDS,
};
use crate::text::{round2, words};

/// Running type-token ratio at which an MTLD factor closes.
pub const MTLD_THRESHOLD: f64 = 0.72;
const ADVANCED_MIN_CHARS: usize = 6;

pub fn type_token_ratio(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let types: HashSet<&str> = words.iter().map(String::as_str).collect();
    types.len() as f64 / words.len() as f64
}

fn mtld_pass<'a>(sequence: impl Iterator<Item = &'a String>, total: usize, overall_ttr: f64) -> f64 {
    let mut types: HashSet<&str> = HashSet::new();
    let mut counter = 0usize;
    let mut factors = 0.0;
    let mut ttr = 1.0;
    for word in sequence {
        counter += 1;
        types.insert(word.as_str());
        ttr = types.len() as f64 / counter as f64;
        if ttr <= MTLD_THRESHOLD {
            counter = 0;
            types.clear();
            factors += 1.0;
        }
    }
    if counter > 0 {
        factors += (1.0 - ttr) / (1.0 - MTLD_THRESHOLD);
    }
    if factors == 0.0 {
        factors = if overall_ttr == 1.0 {
            1.0
        } else {
            (1.0 - overall_ttr) / (1.0 - MTLD_THRESHOLD)
        };
    }
    total as f64 / factors
}

/// Measure of textual lexical diversity, averaged over a forward and a
/// backward pass.
pub fn mtld(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let overall = type_token_ratio(words);
    let forward = mtld_pass(words.iter(), words.len(), overall);
    let backward = mtld_pass(words.iter().rev(), words.len(), overall);
    (forward + backward) / 2.0
}

/// Minimums for one vocabulary band. TTR and MTLD must be exceeded, the
/// ratios met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityBand {
    pub min_ttr: f64,
    pub min_mtld: f64,
    #[serde(default)]
    pub min_advanced_ratio: f64,
    #[serde(default)]
    pub min_academic_ratio: f64,
}

impl DiversityBand {
    fn admits(&self, metrics: &VocabularyMetrics) -> bool {
        metrics.ttr > self.min_ttr
            && metrics.mtld > self.min_mtld
            && metrics.advanced_ratio >= self.min_advanced_ratio
            && metrics.academic_ratio >= self.min_academic_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum VocabularyModel {
    /// Two points for `full`, one for `partial`.
    Diversity {
        full: DiversityBand,
        partial: DiversityBand,
    },
    /// Starts from two points and deducts for informal, vague, repetitive or
    /// elementary word use; bonuses for advanced and rare words.
    Profile,
}

impl VocabularyModel {
    pub fn summary_diversity() -> Self {
        Self::Diversity {
            full: DiversityBand {
                min_ttr: 0.7,
                min_mtld: 20.0,
                min_advanced_ratio: 0.0,
                min_academic_ratio: 0.0,
            },
            partial: DiversityBand {
                min_ttr: 0.5,
                min_mtld: 15.0,
                min_advanced_ratio: 0.0,
                min_academic_ratio: 0.0,
            },
        }
    }

    pub fn essay_diversity() -> Self {
        Self::Diversity {
            full: DiversityBand {
                min_ttr: 0.75,
                min_mtld: 25.0,
                min_advanced_ratio: 0.3,
                min_academic_ratio: 0.1,
            },
            partial: DiversityBand {
                min_ttr: 0.65,
                min_mtld: 20.0,
                min_advanced_ratio: 0.2,
                min_academic_ratio: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VocabularyMetrics {
    pub word_count: usize,
    pub ttr: f64,
    pub mtld: f64,
    pub advanced_ratio: f64,
    pub academic_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<LexicalProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LexicalProfile {
    pub inappropriate: usize,
    pub elementary_ratio: f64,
    pub upper_band_ratio: f64,
    pub rare_ratio: f64,
    pub overused_words: Vec<String>,
    pub raw_score: f64,
}

fn has_academic_suffix(word: &str) -> bool {
    ACADEMIC_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn diversity_metrics(all_words: &[String]) -> VocabularyMetrics {
    let advanced = all_words
        .iter()
        .filter(|w| w.chars().count() >= ADVANCED_MIN_CHARS && w.chars().all(char::is_alphabetic))
        .count();
    let academic = all_words.iter().filter(|w| has_academic_suffix(w)).count();
    VocabularyMetrics {
        word_count: all_words.len(),
        ttr: round2(type_token_ratio(all_words)),
        mtld: round2(mtld(all_words)),
        advanced_ratio: round2(ratio(advanced, all_words.len())),
        academic_ratio: round2(ratio(academic, all_words.len())),
        profile: None,
    }
}

fn lexical_profile(all_words: &[String]) -> (u8, VocabularyMetrics) {
    let lexical: Vec<String> = all_words
        .iter()
        .filter(|w| w.chars().count() > 1 && w.chars().all(char::is_alphabetic))
        .cloned()
        .collect();
    if lexical.is_empty() {
        return (0, VocabularyMetrics::default());
    }
    let total = lexical.len();

    let informal = lexical.iter().filter(|w| INFORMAL_WORDS.contains(w.as_str())).count();
    let vague = lexical.iter().filter(|w| VAGUE_WORDS.contains(w.as_str())).count();
    let contractions = all_words
        .iter()
        .filter(|w| CONTRACTIONS.contains(w.as_str()))
        .count();
    let inappropriate = informal + vague + contractions;

    let academic_ratio = ratio(lexical.iter().filter(|w| is_academic(w)).count(), total);
    let advanced_ratio = ratio(
        lexical.iter().filter(|w| w.chars().count() >= ADVANCED_MIN_CHARS).count(),
        total,
    );
    let elementary_ratio = ratio(
        lexical.iter().filter(|w| cefr_band(w) == Some(CefrBand::A1)).count(),
        total,
    );
    let upper_band_ratio = ratio(
        lexical
            .iter()
            .filter(|w| matches!(cefr_band(w), Some(CefrBand::B2 | CefrBand::C1 | CefrBand::C2)))
            .count(),
        total,
    );
    let rare_ratio = ratio(
        lexical.iter().filter(|w| frequency_band(w) == FrequencyBand::Rare).count(),
        total,
    );
    let ttr = type_token_ratio(&lexical);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &lexical {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    let mut overused: Vec<String> = counts
        .into_iter()
        .filter(|(word, count)| *count > 3 && word.chars().count() > 3)
        .map(|(word, _)| word.to_string())
        .collect();
    overused.sort();

    let mut score: f64 = 2.0;
    if inappropriate >= 5 {
        score -= 2.0;
    } else if inappropriate >= 3 {
        score -= 1.0;
    }
    if academic_ratio < 0.05 {
        score -= 1.0;
    }
    if advanced_ratio < 0.25 {
        score -= 0.5;
    }
    if elementary_ratio > 0.6 {
        score -= 1.0;
    }
    if overused.len() > 2 {
        score -= 0.5;
    }
    if ttr < 0.6 {
        score -= 0.5;
    }
    if upper_band_ratio >= 0.15 && academic_ratio >= 0.10 {
        score = (score + 0.5).min(2.0);
    }
    if rare_ratio >= 0.12 && inappropriate == 0 {
        score = (score + 0.5).min(2.0);
    }
    let raw_score = ((score * 2.0).round() / 2.0).clamp(0.0, 2.0);
    // half points round down
    let points = raw_score.floor() as u8;

    let metrics = VocabularyMetrics {
        word_count: total,
        ttr: round2(ttr),
        mtld: round2(mtld(&lexical)),
        advanced_ratio: round2(advanced_ratio),
        academic_ratio: round2(academic_ratio),
        profile: Some(LexicalProfile {
            inappropriate,
            elementary_ratio: round2(elementary_ratio),
            upper_band_ratio: round2(upper_band_ratio),
            rare_ratio: round2(rare_ratio),
            overused_words: overused,
            raw_score,
        }),
    };
    (points, metrics)
}

/// Base vocabulary points (0–2) before cross-penalties.
pub fn score_vocabulary(text: &str, model: &VocabularyModel) -> (u8, VocabularyMetrics) {
    let all_words = words(text);
    match model {
        VocabularyModel::Diversity { full, partial } => {
            let metrics = diversity_metrics(&all_words);
            let points = if full.admits(&metrics) {
                2
            } else if partial.admits(&metrics) {
                1
            } else {
                0
            };
            (points, metrics)
        }
        VocabularyModel::Profile => lexical_profile(&all_words),
    }
}
