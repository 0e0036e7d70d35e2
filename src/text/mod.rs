//! Text canonicalization shared by every scoring stage.

pub mod lexicon;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Token;

/// Sentence pieces at or below this many characters are treated as noise.
pub const MIN_SENTENCE_CHARS: usize = 5;

static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n\s*\n").expect("sentence boundary pattern"));
static VOWEL_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new("[aeiouy]+").expect("vowel pattern"));

fn canonical_apostrophe(c: char) -> char {
    match c {
        '\u{2019}' | '\u{2018}' | '`' => '\'',
        other => other,
    }
}

/// Canonical form of a single whitespace-delimited word: lowercase, curly
/// quotes and backticks folded to `'`, everything except word characters and
/// word-internal apostrophes removed.
///
/// With `strip_trailing_period == false` a word-final `.` survives so callers
/// can inspect sentence-final punctuation.
pub fn normalize_word(word: &str, strip_trailing_period: bool) -> String {
    let lowered: String = word.trim().to_lowercase().chars().map(canonical_apostrophe).collect();
    let keep_period = !strip_trailing_period && lowered.ends_with('.');

    let kept: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '\'')
        .collect();
    let mut normalized = kept.trim_matches('\'').to_string();
    if keep_period && !normalized.is_empty() {
        normalized.push('.');
    }
    normalized
}

/// Normalizes every word of `text` and joins them with single spaces.
pub fn normalize(text: &str, strip_trailing_period: bool) -> String {
    text.split_whitespace()
        .map(|word| normalize_word(word, strip_trailing_period))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace tokenization; tokens whose normalized form is empty are dropped
/// and positions are dense over the kept tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|word| {
            let normalized = normalize_word(word, true);
            (!normalized.is_empty()).then(|| (word.to_string(), normalized))
        })
        .enumerate()
        .map(|(position, (text, normalized))| Token {
            text,
            normalized,
            position,
        })
        .collect()
}

/// Normalized words of `text`, in order.
pub fn words(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|token| token.normalized).collect()
}

/// Splits on `.`, `!`, `?` followed by whitespace (or end of text) and on
/// blank lines, keeping pieces longer than [`MIN_SENTENCE_CHARS`].
pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|piece| piece.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_string)
        .collect()
}

/// Heuristic syllable count: vowel groups per whitespace word.
pub fn count_syllables(text: &str) -> u32 {
    text.split_whitespace()
        .map(|word| VOWEL_GROUP.find_iter(&word.to_lowercase()).count() as u32)
        .sum()
}

/// Crude inflection stripping so "damages", "damaged" and "damage" meet.
pub fn stem(word: &str) -> String {
    let len = word.chars().count();
    if let Some(base) = word.strip_suffix("ies").filter(|_| len > 4) {
        return format!("{base}y");
    }
    for (suffix, min_len) in [("ing", 6), ("ed", 5), ("ly", 5), ("es", 5), ("s", 4)] {
        if len >= min_len && !word.ends_with("ss") {
            if let Some(base) = word.strip_suffix(suffix) {
                return base.trim_end_matches('e').to_string();
            }
        }
    }
    word.trim_end_matches('e').to_string()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        Lazy::force(&SENTENCE_BOUNDARY);
        Lazy::force(&VOWEL_GROUP);
    }

    #[test]
    fn normalize_folds_case_punctuation_and_apostrophes() {
        assert_eq!(normalize("  The Cat’s   HAT, isn`t it?  ", true), "the cat's hat isn't it");
        assert_eq!(normalize("", true), "");
        assert_eq!(normalize("... --- !!!", true), "");
    }

    #[test]
    fn trailing_period_survives_only_when_requested() {
        assert_eq!(normalize_word("Mat.", true), "mat");
        assert_eq!(normalize_word("Mat.", false), "mat.");
        assert_eq!(normalize_word("mat,", false), "mat");
        assert_eq!(normalize("The end.", false), "the end.");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("Rock’n’roll, 'quoted' words!", true);
        assert_eq!(normalize(&once, true), once);
    }

    #[test]
    fn tokenize_drops_empty_tokens_and_keeps_dense_positions() {
        let tokens = tokenize("Hello , world -- again");
        let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
        assert_eq!(normalized, ["hello", "world", "again"]);
        assert_eq!(tokens[2].position, 2);
        assert_eq!(tokens[2].text, "again");
    }

    #[test]
    fn split_sentences_drops_short_fragments() {
        let sentences = split_sentences("Climate is changing fast. Yes! Oceans are warming too.");
        assert_eq!(
            sentences,
            ["Climate is changing fast", "Oceans are warming too"]
        );
    }

    #[test]
    fn split_sentences_keeps_decimals_together() {
        let sentences = split_sentences("Growth reached 3.5 percent last year. It slowed after.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("3.5"));
    }

    #[test]
    fn syllables_count_vowel_groups() {
        assert_eq!(count_syllables("The quick brown fox"), 4);
        assert_eq!(count_syllables("Beautiful"), 3);
        assert_eq!(count_syllables(""), 0);
    }

    #[test]
    fn stem_merges_common_inflections() {
        assert_eq!(stem("damages"), stem("damage"));
        assert_eq!(stem("damaged"), stem("damage"));
        assert_eq!(stem("cities"), "city");
        assert_eq!(stem("class"), "class");
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(10.0), 10.0);
    }
}
