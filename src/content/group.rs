//! Coverage of a multi-speaker discussion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::content::ideas::EmbeddingCache;
use crate::error::ScoreError;
use crate::text::lexicon::SUBJECTIVE_MARKERS;
use crate::text::{normalize, round2, split_sentences};

/// Mean best similarity per speaker is scaled by this into coverage points.
const COVERAGE_SCALE: f64 = 4.0;
const PARAPHRASE_BAND: (f64, f64) = (0.3, 0.9);
const SUBJECTIVITY_WEIGHT: f64 = 5.0;
const RAW_CEILING: f64 = 5.0;

static SPEAKER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z]+(?:[ \t]*\d+)?)[ \t]*:").expect("speaker label pattern")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerTurns {
    pub speaker: String,
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerCoverage {
    pub speaker: String,
    pub sentence_count: usize,
    pub mean_similarity: f64,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCoverage {
    pub speakers: Vec<SpeakerCoverage>,
    /// Sentence-weighted coverage on a 0–4 scale.
    pub raw_idea_coverage: f64,
    pub paraphrase_depth: f64,
    pub subjectivity_ratio: f64,
    pub objectivity_penalty: f64,
    pub mean_best_similarity: f64,
    /// 10–90.
    pub score: f64,
}

fn is_narration(label: &str) -> bool {
    let label = label.to_ascii_lowercase();
    label.starts_with("narrat")
}

/// Splits a labelled transcript ("Speaker 1: ...") into per-speaker
/// sentences, in first-appearance order. Narrator turns are dropped.
pub fn parse_speakers(transcript: &str) -> Vec<SpeakerTurns> {
    let labels: Vec<(usize, usize, String)> = SPEAKER_LABEL
        .captures_iter(transcript)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
            Some((whole.start(), whole.end(), name))
        })
        .collect();

    let mut turns: Vec<SpeakerTurns> = Vec::new();
    for (idx, (_, body_start, name)) in labels.iter().enumerate() {
        if is_narration(name) {
            continue;
        }
        let body_end = labels
            .get(idx + 1)
            .map_or(transcript.len(), |(next_start, _, _)| *next_start);
        let sentences = split_sentences(&transcript[*body_start..body_end]);
        if sentences.is_empty() {
            continue;
        }
        match turns.iter_mut().find(|turn| &turn.speaker == name) {
            Some(turn) => turn.sentences.extend(sentences),
            None => turns.push(SpeakerTurns {
                speaker: name.clone(),
                sentences,
            }),
        }
    }
    turns
}

/// Share of summary words that are opinion or hedging markers.
pub fn subjectivity_ratio(summary: &str) -> f64 {
    let normalized = normalize(summary, true);
    let word_count = normalized.split_whitespace().count();
    if word_count == 0 {
        return 0.0;
    }
    SUBJECTIVE_MARKERS.count_occurrences(&normalized) as f64 / word_count as f64
}

pub(crate) fn score_group(
    speakers: &[SpeakerTurns],
    summary: &str,
    cache: &mut EmbeddingCache<'_>,
) -> Result<GroupCoverage, ScoreError> {
    let mut summary_sentences = split_sentences(summary);
    if summary_sentences.is_empty() && !summary.trim().is_empty() {
        summary_sentences.push(summary.trim().to_string());
    }

    let mut coverage_rows = Vec::with_capacity(speakers.len());
    let mut best_similarities = Vec::new();
    let mut weighted_coverage = 0.0;
    let mut total_sentences = 0usize;
    for turn in speakers {
        let matrix = cache.matrix(&turn.sentences, &summary_sentences)?;
        let best: Vec<f64> = matrix
            .iter()
            .map(|row| row.iter().copied().fold(0.0, f64::max))
            .collect();
        let mean_similarity = if best.is_empty() {
            0.0
        } else {
            best.iter().sum::<f64>() / best.len() as f64
        };
        let coverage = mean_similarity * COVERAGE_SCALE;
        weighted_coverage += coverage * turn.sentences.len() as f64;
        total_sentences += turn.sentences.len();
        best_similarities.extend(best);
        coverage_rows.push(SpeakerCoverage {
            speaker: turn.speaker.clone(),
            sentence_count: turn.sentences.len(),
            mean_similarity: round2(mean_similarity),
            coverage: round2(coverage),
        });
    }

    let raw_idea_coverage = if total_sentences > 0 {
        weighted_coverage / total_sentences as f64
    } else {
        0.0
    };
    let paraphrased: Vec<f64> = best_similarities
        .iter()
        .copied()
        .filter(|sim| *sim > PARAPHRASE_BAND.0 && *sim < PARAPHRASE_BAND.1)
        .collect();
    let paraphrase_depth = if paraphrased.is_empty() {
        0.0
    } else {
        (paraphrased.iter().sum::<f64>() / paraphrased.len() as f64).clamp(0.0, 1.0)
    };
    let mean_best_similarity = if best_similarities.is_empty() {
        0.0
    } else {
        best_similarities.iter().sum::<f64>() / best_similarities.len() as f64
    };
    let subjectivity = subjectivity_ratio(summary);
    let objectivity_penalty = (subjectivity * SUBJECTIVITY_WEIGHT).min(1.0);

    let raw = (raw_idea_coverage + paraphrase_depth - objectivity_penalty).clamp(0.0, RAW_CEILING);
    let score = round2(10.0 + raw / RAW_CEILING * 80.0);

    Ok(GroupCoverage {
        speakers: coverage_rows,
        raw_idea_coverage: round2(raw_idea_coverage),
        paraphrase_depth: round2(paraphrase_depth),
        subjectivity_ratio: round2(subjectivity),
        objectivity_penalty: round2(objectivity_penalty),
        mean_best_similarity,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ideas::test_support::ConstantEmbedder;

    #[test]
    fn speaker_pattern_compiles() {
        assert!(SPEAKER_LABEL.is_match("Speaker 2: hello"));
    }

    const DISCUSSION: &str = "Narrator: Three students discuss the library plan.\n\
        Speaker 1: The library should open later on weekends. Students study at night.\n\
        Speaker 2: Funding is limited this year. Staff costs keep rising.\n\
        Speaker 1: Maybe volunteers could help with the evening desk.";

    #[test]
    fn parses_labels_and_drops_narration() {
        let turns = parse_speakers(DISCUSSION);
        let names: Vec<&str> = turns.iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(names, ["Speaker 1", "Speaker 2"]);
        assert_eq!(turns[0].sentences.len(), 3);
        assert_eq!(turns[1].sentences.len(), 2);
    }

    #[test]
    fn unlabelled_text_yields_no_speakers() {
        assert!(parse_speakers("Just a paragraph without any labels.").is_empty());
    }

    #[test]
    fn subjective_summaries_are_penalized() {
        assert_eq!(subjectivity_ratio(""), 0.0);
        let ratio = subjectivity_ratio("I think maybe the plan works");
        assert!((ratio - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn full_coverage_outside_paraphrase_band() {
        let turns = parse_speakers(DISCUSSION);
        let mut cache = EmbeddingCache::new(&ConstantEmbedder);
        let result = score_group(
            &turns,
            "The speakers weigh later weekend hours against limited funding.",
            &mut cache,
        )
        .expect("group score");
        // every best similarity is 1.0: coverage 4, no paraphrase depth, no penalty
        assert_eq!(result.raw_idea_coverage, 4.0);
        assert_eq!(result.paraphrase_depth, 0.0);
        assert_eq!(result.objectivity_penalty, 0.0);
        assert_eq!(result.score, 74.0);
    }
}
