//! Form, development and linguistic-range criteria for written responses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::lexicon::{CLAUSE_MARKERS, ESSAY_CONNECTORS, PASSIVE_PATTERNS};
use crate::text::{round2, split_sentences};

const FRAGMENT_MAX_CHARS: usize = 10;

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[•\-\*]").expect("bullet pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordWindow {
    pub min: usize,
    pub max: usize,
}

impl WordWindow {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Conditions for one form band. All-caps text never qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormBand {
    pub points: u8,
    pub word_windows: Vec<WordWindow>,
    #[serde(default)]
    pub min_terminators: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_terminators: Option<usize>,
    #[serde(default)]
    pub forbid_bullets: bool,
    #[serde(default)]
    pub forbid_fragments: bool,
}

impl FormBand {
    fn admits(&self, checks: &FormChecks) -> bool {
        !checks.is_all_caps
            && self.word_windows.iter().any(|w| w.contains(checks.word_count))
            && checks.terminator_count >= self.min_terminators
            && self.max_terminators.map_or(true, |max| checks.terminator_count <= max)
            && !(self.forbid_bullets && checks.has_bullets)
            && !(self.forbid_fragments && checks.has_fragments)
    }
}

/// Bands in descending order of points; no match scores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRubric {
    pub bands: Vec<FormBand>,
}

impl FormRubric {
    pub fn summarize_spoken() -> Self {
        Self {
            bands: vec![
                FormBand {
                    points: 2,
                    word_windows: vec![WordWindow::new(50, 70)],
                    min_terminators: 1,
                    max_terminators: None,
                    forbid_bullets: true,
                    forbid_fragments: true,
                },
                FormBand {
                    points: 1,
                    word_windows: vec![WordWindow::new(40, 49), WordWindow::new(71, 100)],
                    min_terminators: 1,
                    max_terminators: None,
                    forbid_bullets: false,
                    forbid_fragments: false,
                },
            ],
        }
    }

    /// One sentence of 5–75 words.
    pub fn summarize_written() -> Self {
        Self {
            bands: vec![FormBand {
                points: 1,
                word_windows: vec![WordWindow::new(5, 75)],
                min_terminators: 1,
                max_terminators: Some(1),
                forbid_bullets: false,
                forbid_fragments: false,
            }],
        }
    }

    pub fn essay() -> Self {
        Self {
            bands: vec![
                FormBand {
                    points: 2,
                    word_windows: vec![WordWindow::new(200, 300)],
                    min_terminators: 1,
                    max_terminators: None,
                    forbid_bullets: true,
                    forbid_fragments: false,
                },
                FormBand {
                    points: 1,
                    word_windows: vec![WordWindow::new(120, 199), WordWindow::new(301, 380)],
                    min_terminators: 1,
                    max_terminators: None,
                    forbid_bullets: false,
                    forbid_fragments: false,
                },
            ],
        }
    }

    pub fn max_points(&self) -> u8 {
        self.bands.iter().map(|band| band.points).max().unwrap_or(0)
    }

    pub fn score(&self, text: &str) -> FormAssessment {
        let checks = FormChecks::of(text);
        let points = self
            .bands
            .iter()
            .find(|band| band.admits(&checks))
            .map_or(0, |band| band.points);
        FormAssessment {
            points,
            max_points: self.max_points(),
            checks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormChecks {
    pub word_count: usize,
    pub terminator_count: usize,
    pub is_all_caps: bool,
    pub has_bullets: bool,
    pub has_fragments: bool,
}

impl FormChecks {
    pub fn of(text: &str) -> Self {
        let trimmed = text.trim();
        let terminator_count = trimmed.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
        let is_all_caps = trimmed.chars().any(char::is_alphabetic)
            && !trimmed.chars().any(char::is_lowercase);
        let has_bullets = BULLET.is_match(text);
        let has_fragments = terminator_count == 0
            || trimmed
                .split(|c| matches!(c, '.' | '!' | '?'))
                .map(str::trim)
                .any(|piece| !piece.is_empty() && piece.chars().count() < FRAGMENT_MAX_CHARS);
        Self {
            word_count: trimmed.split_whitespace().count(),
            terminator_count,
            is_all_caps,
            has_bullets,
            has_fragments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormAssessment {
    pub points: u8,
    pub max_points: u8,
    pub checks: FormChecks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAssessment {
    pub points: u8,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub mean_sentence_words: f64,
    pub connector_count: usize,
}

/// Development, structure and coherence of an essay (0–2).
pub fn score_structure(text: &str) -> StructureAssessment {
    let sentence_count = split_sentences(text).len();
    let word_count = text.split_whitespace().count();
    let paragraph_count = text.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let mean_sentence_words = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };
    let connector_count = ESSAY_CONNECTORS.count_distinct(text);

    let points = if sentence_count >= 8
        && mean_sentence_words >= 15.0
        && paragraph_count >= 2
        && connector_count >= 2
    {
        2
    } else if sentence_count >= 5
        && mean_sentence_words >= 12.0
        && paragraph_count >= 1
        && connector_count >= 1
    {
        1
    } else {
        0
    };

    StructureAssessment {
        points,
        sentence_count,
        paragraph_count,
        mean_sentence_words: round2(mean_sentence_words),
        connector_count,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAssessment {
    pub points: u8,
    pub complexity_ratio: f64,
    pub passive_ratio: f64,
}

/// General linguistic range (0–2): subordinate clauses and passive voice.
pub fn score_linguistic_range(text: &str) -> RangeAssessment {
    let sentences = split_sentences(text);
    let sentence_count = sentences.len();
    let complex = sentences.iter().filter(|s| CLAUSE_MARKERS.any_in(s)).count();
    let passive: usize = PASSIVE_PATTERNS.iter().map(|re| re.find_iter(text).count()).sum();
    let (complexity_ratio, passive_ratio) = if sentence_count > 0 {
        (
            complex as f64 / sentence_count as f64,
            passive as f64 / sentence_count as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let points = if complexity_ratio >= 0.4 && passive_ratio >= 0.1 && sentence_count >= 8 {
        2
    } else if complexity_ratio >= 0.2 && sentence_count >= 5 {
        1
    } else {
        0
    };
    RangeAssessment {
        points,
        complexity_ratio: round2(complexity_ratio),
        passive_ratio: round2(passive_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_pattern_compiles() {
        assert!(BULLET.is_match("Intro\n - first point"));
        assert!(!BULLET.is_match("No list here."));
    }

    fn sentence_of(words: usize) -> String {
        let mut text = vec!["word"; words].join(" ");
        text.push('.');
        text
    }

    #[test]
    fn written_summary_must_be_one_sentence() {
        let rubric = FormRubric::summarize_written();
        assert_eq!(rubric.score(&sentence_of(30)).points, 1);
        assert_eq!(rubric.score(&format!("{} Second one.", sentence_of(30))).points, 0);
        assert_eq!(rubric.score(&sentence_of(80)).points, 0);
        assert_eq!(rubric.score("SHOUTING THE WHOLE SUMMARY NOW.").points, 0);
    }

    #[test]
    fn spoken_summary_bands() {
        let rubric = FormRubric::summarize_spoken();
        assert_eq!(rubric.score(&sentence_of(60)).points, 2);
        assert_eq!(rubric.score(&sentence_of(45)).points, 1);
        assert_eq!(rubric.score(&sentence_of(120)).points, 0);
        // the bullet disqualifies the top band and 60 words miss the lower one
        let bulleted = format!("- {}", sentence_of(59));
        assert_eq!(rubric.score(&bulleted).points, 0);
        assert!(rubric.score(&bulleted).checks.has_bullets);
    }

    #[test]
    fn fragments_are_detected() {
        let checks = FormChecks::of("A full sentence here. Tiny. Another full sentence.");
        assert!(checks.has_fragments);
        assert!(FormChecks::of("no terminator at all").has_fragments);
        assert!(!FormChecks::of("A complete thought is here.").has_fragments);
    }

    #[test]
    fn structure_rewards_developed_paragraphs() {
        let sentence = "Public transport reduces congestion in busy cities and therefore improves daily life for many residents.";
        let paragraph = vec![sentence; 4].join(" ");
        let essay = format!("{paragraph}\n\nHowever, {paragraph}");
        let result = score_structure(&essay);
        assert_eq!(result.sentence_count, 8);
        assert_eq!(result.paragraph_count, 2);
        assert_eq!(result.points, 2);
        assert_eq!(score_structure("Too short.").points, 0);
    }

    #[test]
    fn range_counts_clauses_and_passives() {
        let text = "The bridge was designed because traffic grew. \
                    Roads were widened when budgets allowed. \
                    Cities expand quickly. \
                    Planners respond slowly. \
                    Residents notice delays.";
        let result = score_linguistic_range(text);
        assert_eq!(result.complexity_ratio, 0.4);
        assert_eq!(result.passive_ratio, 0.4);
        assert_eq!(result.points, 1);
    }
}
