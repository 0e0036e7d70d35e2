//! Built-in content cascades.

use crate::rubric::{RubricRule, RubricTable, Signal, Threshold};

/// Phrases a respond-to-situation answer is expected to use when none are
/// supplied with the request.
pub const DEFAULT_SITUATION_PHRASES: &[&str] = &[
    "unprepared",
    "go later",
    "someone else",
    "not ready",
    "delay",
    "present first",
];

fn min(signal: Signal, value: f64) -> Threshold {
    Threshold::at_least(signal, value)
}

fn over(signal: Signal, value: f64) -> Threshold {
    Threshold::above(signal, value)
}

/// Summarize spoken text, 0–2.
pub fn summarize_spoken() -> RubricTable {
    RubricTable::builtin(
        vec![
            RubricRule::new(2, "Summary captures the main points of the lecture")
                .require(min(Signal::Similarity, 0.85)),
            RubricRule::new(1, "Summary covers some of the lecture but misses key points")
                .require(min(Signal::Similarity, 0.70)),
        ],
        RubricRule::new(0, "Summary is unrelated to the lecture"),
    )
}

/// Summarize written text, 0–4.
pub fn summarize_written() -> RubricTable {
    use Signal::*;
    RubricTable::builtin(
        vec![
            RubricRule::new(4, "Comprehensive summary that paraphrases and connects the key ideas")
                .require(min(Similarity, 0.80))
                .require(min(IdeaCoverage, 0.67))
                .require(min(Paraphrase, 0.30))
                .require(min(Originality, 0.70))
                .require(min(ConnectorDiversity, 2.0))
                .require(min(Synthesis, 0.50)),
            RubricRule::new(3, "Good summary of most key ideas with some paraphrasing")
                .require(min(Similarity, 0.70))
                .require(min(IdeaCoverage, 0.50))
                .require(min(Paraphrase, 0.20)),
            RubricRule::new(2, "Partial summary; several key ideas are missing")
                .require(min(Similarity, 0.60))
                .require(min(IdeaCoverage, 0.33)),
            RubricRule::new(1, "Summary touches on the topic only loosely")
                .require(min(Similarity, 0.45)),
        ],
        RubricRule::new(0, "Summary does not reflect the passage"),
    )
}

/// Write essay, 0–6.
pub fn essay() -> RubricTable {
    use Signal::*;
    RubricTable::builtin(
        vec![
            RubricRule::new(6, "Fully addresses the prompt with a developed, well-concluded argument")
                .require(min(Similarity, 0.75))
                .require(min(ArgumentMarkers, 4.0))
                .require(min(ConclusionMarkers, 1.0))
                .require(min(ConnectorDiversity, 6.0))
                .require(min(Coherence, 0.35)),
            RubricRule::new(5, "Addresses the prompt with a clear argument and conclusion")
                .require(min(Similarity, 0.70))
                .require(min(ArgumentMarkers, 3.0))
                .require(min(ConclusionMarkers, 1.0))
                .require(min(ConnectorDiversity, 4.0)),
            RubricRule::new(4, "Relevant argument with supporting points and a conclusion")
                .require(min(Similarity, 0.65))
                .require(min(ArgumentMarkers, 3.0))
                .require(min(ConclusionMarkers, 1.0)),
            RubricRule::new(3, "Relevant response with some argument structure")
                .require(min(Similarity, 0.60))
                .require(min(ArgumentMarkers, 2.0)),
            RubricRule::new(2, "Relevant to the prompt but the argument is undeveloped")
                .require(min(Similarity, 0.60)),
            RubricRule::new(1, "Only loosely related to the prompt")
                .require(min(Similarity, 0.40)),
        ],
        RubricRule::new(0, "Does not address the prompt"),
    )
}

/// Respond to a situation; levels 6–0 award 90 down to 10 points.
pub fn respond_situation() -> RubricTable {
    use Signal::*;
    RubricTable::builtin(
        vec![
            RubricRule::new(6, "Fully appropriate response covering the expected points")
                .points(90.0)
                .require(over(Similarity, 0.85))
                .require(over(WordCount, 40.0))
                .require(min(KeywordHits, 2.0)),
            RubricRule::new(5, "Appropriate response covering most expected points")
                .points(75.0)
                .require(over(Similarity, 0.75))
                .require(over(WordCount, 30.0))
                .require(min(KeywordHits, 2.0)),
            RubricRule::new(4, "Relevant response with at least one expected point")
                .points(60.0)
                .require(over(Similarity, 0.65))
                .require(over(WordCount, 25.0))
                .require(min(KeywordHits, 1.0)),
            RubricRule::new(3, "Relevant but brief response")
                .points(45.0)
                .require(over(Similarity, 0.55))
                .require(over(WordCount, 20.0)),
            RubricRule::new(2, "Partially relevant response")
                .points(30.0)
                .require(over(Similarity, 0.40)),
            RubricRule::new(1, "Barely relevant response")
                .points(15.0)
                .require(over(Similarity, 0.20)),
        ],
        RubricRule::new(0, "Response does not address the situation").points(10.0),
    )
}
