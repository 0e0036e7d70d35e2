use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::acoustic::disfluency::count_disfluencies;
use crate::acoustic::reference::score_reference_pronunciation;
use crate::acoustic::{rubric_level, AcousticCurve, MIN_SCORE};
use crate::aggregate::Criterion;
use crate::alignment::align;
use crate::content::ContentAnalysis;
use crate::error::ScoreError;
use crate::linguistic::form::{score_linguistic_range, score_structure};
use crate::linguistic::highlights::flag_issues;
use crate::linguistic::score_linguistic;
use crate::pipeline::bounded;
use crate::pipeline::traits::{Embedder, SpeechFrontend, TextChecker};
use crate::profile::{ExerciseProfile, ProfileSet, PronunciationModel};
use crate::report::ScoreReport;
use crate::text::{round2, tokenize, words};
use crate::types::{AcousticFeatures, EvaluationRequest, Response, TextIssue};

/// Criteria summed into `total` for written exercises.
const TOTAL_CRITERIA: [Criterion; 7] = [
    Criterion::Content,
    Criterion::Form,
    Criterion::Grammar,
    Criterion::Spelling,
    Criterion::Vocabulary,
    Criterion::Structure,
    Criterion::LinguisticRange,
];

/// Scores responses for every exercise type through one pipeline; the
/// exercise only selects an [`ExerciseProfile`].
pub struct Evaluator {
    profiles: ProfileSet,
    embedder: Arc<dyn Embedder>,
    text_checker: Arc<dyn TextChecker>,
    speech_frontend: Option<Arc<dyn SpeechFrontend>>,
    collaborator_timeout: Option<Duration>,
}

pub(crate) struct EvaluatorParts {
    pub profiles: ProfileSet,
    pub embedder: Arc<dyn Embedder>,
    pub text_checker: Arc<dyn TextChecker>,
    pub speech_frontend: Option<Arc<dyn SpeechFrontend>>,
    pub collaborator_timeout: Option<Duration>,
}

/// Response text plus the acoustic measurements when it was spoken.
struct Answer {
    text: String,
    features: Option<AcousticFeatures>,
}

enum Resolved {
    Ready(Answer),
    /// No transcript could be produced from the audio.
    FrontendFailed(ScoreError),
}

impl Evaluator {
    pub(crate) fn from_parts(parts: EvaluatorParts) -> Self {
        Self {
            profiles: parts.profiles,
            embedder: parts.embedder,
            text_checker: parts.text_checker,
            speech_frontend: parts.speech_frontend,
            collaborator_timeout: parts.collaborator_timeout,
        }
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// Scores one response.
    ///
    /// Only malformed requests are errors. Collaborator failures and
    /// timeouts produce a report marked degraded, with the affected criteria
    /// at their minimum.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<ScoreReport, ScoreError> {
        let profile = self.profiles.get(request.exercise).ok_or_else(|| {
            ScoreError::config(format!("no profile for exercise {}", request.exercise))
        })?;
        if request.reference.trim().is_empty() {
            return Err(ScoreError::invalid_input("reference text is missing"));
        }
        let response = request
            .response
            .as_ref()
            .ok_or_else(|| ScoreError::invalid_input("response is missing"))?;
        if response.kind() != profile.accepts {
            return Err(ScoreError::invalid_input(format!(
                "{} expects a {:?} response",
                request.exercise, profile.accepts
            )));
        }

        let answer = match self.resolve(response)? {
            Resolved::Ready(answer) => answer,
            Resolved::FrontendFailed(err) => {
                tracing::warn!(exercise = %request.exercise, error = %err, "no transcript; reporting minimum scores");
                let mut report = minimum_report(profile, "no transcript available");
                report.degrade("speech frontend", &err);
                return Ok(report);
            }
        };

        if words(&answer.text).is_empty() || tokenize(&request.reference).is_empty() {
            let reason = if words(&answer.text).is_empty() {
                "response has no scorable words"
            } else {
                "reference has no scorable words"
            };
            tracing::warn!(exercise = %request.exercise, reason, "degenerate input scored at the floor");
            let mut report = minimum_report(profile, reason);
            if let Some(mode) = profile.alignment {
                report.set_highlights(align(
                    &tokenize(&request.reference),
                    &tokenize(&answer.text),
                    mode,
                ));
            }
            report.warn(reason);
            return Ok(report);
        }

        Ok(self.score(profile, request, &answer))
    }

    fn resolve(&self, response: &Response) -> Result<Resolved, ScoreError> {
        match response {
            Response::Text { text } => Ok(Resolved::Ready(Answer {
                text: text.clone(),
                features: None,
            })),
            Response::Speech { features } => {
                features.validate()?;
                Ok(Resolved::Ready(Answer {
                    text: features.transcript.clone(),
                    features: Some(features.clone()),
                }))
            }
            Response::Audio { clip } => {
                let Some(frontend) = &self.speech_frontend else {
                    return Ok(Resolved::FrontendFailed(ScoreError::collaborator(
                        "speech frontend",
                        "no speech frontend configured",
                    )));
                };
                let (transcript, raw) =
                    match bounded::transcribe(frontend, clip, self.collaborator_timeout) {
                        Ok(measured) => measured,
                        Err(err) => return Ok(Resolved::FrontendFailed(err)),
                    };
                let features = AcousticFeatures::from_raw(transcript, &raw);
                if let Err(err) = features.validate() {
                    return Ok(Resolved::FrontendFailed(ScoreError::collaborator(
                        "speech frontend",
                        err,
                    )));
                }
                Ok(Resolved::Ready(Answer {
                    text: features.transcript.clone(),
                    features: Some(features),
                }))
            }
        }
    }

    fn score(&self, profile: &ExerciseProfile, request: &EvaluationRequest, answer: &Answer) -> ScoreReport {
        let mut report = ScoreReport::new(profile.exercise);
        let reference = request.reference.as_str();
        let text = answer.text.as_str();

        let key_phrases = if request.key_phrases.is_empty() {
            &profile.key_phrases
        } else {
            &request.key_phrases
        };
        let content = match bounded::content(
            &self.embedder,
            reference,
            text,
            &profile.content,
            key_phrases,
            self.collaborator_timeout,
        ) {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!(exercise = %profile.exercise, error = %err, "content scoring failed; content floored");
                report.degrade("embedder", &err);
                ContentAnalysis::floor(&profile.content, &err.to_string())
            }
        };
        report.set_score(Criterion::Content, content.score);

        if let Some(features) = &answer.features {
            self.score_acoustics(profile, reference, features, content.score, &mut report);
        }

        let issues = if profile.linguistic.is_some() {
            self.check_text(text, &mut report)
        } else {
            Vec::new()
        };
        if let Some(linguistic) = &profile.linguistic {
            let assessment = score_linguistic(text, &issues, linguistic);
            report.set_score(Criterion::Grammar, assessment.scores.grammar as f64);
            report.set_score(Criterion::Spelling, assessment.scores.spelling as f64);
            report.set_score(Criterion::Vocabulary, assessment.scores.vocabulary as f64);
            report.insert_detail("linguistic", json!(assessment));
        }
        if let Some(form) = &profile.form {
            let assessment = form.score(text);
            report.set_score(Criterion::Form, assessment.points as f64);
            report.insert_detail("form", json!(assessment));
        }
        if profile.structure {
            let assessment = score_structure(text);
            report.set_score(Criterion::Structure, assessment.points as f64);
            report.insert_detail("structure", json!(assessment));
        }
        if profile.linguistic_range {
            let assessment = score_linguistic_range(text);
            report.set_score(Criterion::LinguisticRange, assessment.points as f64);
            report.insert_detail("linguistic_range", json!(assessment));
        }

        if let Some(mode) = profile.alignment {
            report.set_highlights(align(&tokenize(reference), &tokenize(text), mode));
        } else if profile.linguistic.is_some() {
            report.set_highlights(flag_issues(text, &issues));
        }
        report.insert_detail("content", json!(content));

        finish(profile, &mut report);
        tracing::debug!(
            exercise = %profile.exercise,
            content = content.score,
            degraded = report.is_degraded(),
            "evaluation finished"
        );
        report
    }

    fn score_acoustics(
        &self,
        profile: &ExerciseProfile,
        reference: &str,
        features: &AcousticFeatures,
        content_score: f64,
        report: &mut ScoreReport,
    ) {
        let pronunciation = match profile.pronunciation {
            Some(PronunciationModel::Acoustic) => {
                let breakdown = AcousticCurve::PRONUNCIATION.score(features);
                report.insert_detail("pronunciation", json!(breakdown));
                Some(breakdown.score)
            }
            Some(PronunciationModel::ReferenceAccuracy) => {
                let reading = score_reference_pronunciation(reference, features);
                let score = reading.score;
                report.insert_detail("pronunciation", json!(reading));
                Some(score)
            }
            None => None,
        };
        let fluency = profile.fluency.then(|| {
            let breakdown = AcousticCurve::FLUENCY.score(features);
            report.insert_detail("fluency", json!(breakdown));
            breakdown.score
        });
        report.insert_detail("acoustic_level", json!(rubric_level(features)));
        report.insert_detail("disfluency", json!(count_disfluencies(&features.transcript)));

        let (pronunciation, fluency) = match &profile.gate {
            Some(gate) => {
                let gated = gate.apply(
                    content_score,
                    pronunciation.unwrap_or(MIN_SCORE),
                    fluency.unwrap_or(MIN_SCORE),
                );
                report.insert_detail("penalty_info", json!(gated));
                (
                    pronunciation.map(|_| gated.pronunciation),
                    fluency.map(|_| gated.fluency),
                )
            }
            None => (pronunciation, fluency),
        };
        if let Some(score) = pronunciation {
            report.set_score(Criterion::Pronunciation, score);
        }
        if let Some(score) = fluency {
            report.set_score(Criterion::Fluency, score);
        }
    }

    fn check_text(&self, text: &str, report: &mut ScoreReport) -> Vec<TextIssue> {
        match bounded::check_text(&self.text_checker, text, self.collaborator_timeout) {
            Ok(issues) => issues,
            Err(err) => {
                tracing::warn!(error = %err, "text checker failed; assuming no issues");
                report.degrade("text checker", &err);
                Vec::new()
            }
        }
    }
}

/// Every criterion the profile scores, at its minimum.
fn minimum_report(profile: &ExerciseProfile, reason: &str) -> ScoreReport {
    let mut report = ScoreReport::new(profile.exercise);
    let content = ContentAnalysis::floor(&profile.content, reason);
    report.set_score(Criterion::Content, content.score);
    report.insert_detail("content", json!(content));
    if profile.pronunciation.is_some() {
        report.set_score(Criterion::Pronunciation, MIN_SCORE);
    }
    if profile.fluency {
        report.set_score(Criterion::Fluency, MIN_SCORE);
    }
    if profile.linguistic.is_some() {
        for criterion in [Criterion::Grammar, Criterion::Spelling, Criterion::Vocabulary] {
            report.set_score(criterion, 0.0);
        }
    }
    if profile.form.is_some() {
        report.set_score(Criterion::Form, 0.0);
    }
    if profile.structure {
        report.set_score(Criterion::Structure, 0.0);
    }
    if profile.linguistic_range {
        report.set_score(Criterion::LinguisticRange, 0.0);
    }
    finish(profile, &mut report);
    report
}

fn finish(profile: &ExerciseProfile, report: &mut ScoreReport) {
    if profile.include_total {
        let total: f64 = TOTAL_CRITERIA
            .iter()
            .filter_map(|&criterion| report.score(criterion))
            .sum();
        report.set_score(Criterion::Total, round2(total));
    }
    for blend in &profile.composites {
        if let Some(value) = blend.evaluate(|criterion| report.score(criterion)) {
            report.set_composite(blend.composite, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Composite;
    use crate::pipeline::defaults::{HashedBagOfWords, NoIssueChecker};
    use crate::types::{AudioClip, ExerciseType, RawAcoustics};

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ScoreError> {
            Err(ScoreError::collaborator("embedder", "model not loaded"))
        }
    }

    struct EchoFrontend;

    impl SpeechFrontend for EchoFrontend {
        fn transcribe(&self, _clip: &AudioClip) -> Result<String, ScoreError> {
            Ok("the cat sat on the mat".to_string())
        }

        fn extract_features(&self, _clip: &AudioClip) -> Result<RawAcoustics, ScoreError> {
            Ok(RawAcoustics {
                duration_sec: 2.0,
                intonation_std: 25.0,
                syllable_count: None,
                speech_rate: None,
            })
        }
    }

    fn evaluator(embedder: Arc<dyn Embedder>, frontend: Option<Arc<dyn SpeechFrontend>>) -> Evaluator {
        Evaluator::from_parts(EvaluatorParts {
            profiles: ProfileSet::builtin(),
            embedder,
            text_checker: Arc::new(NoIssueChecker),
            speech_frontend: frontend,
            collaborator_timeout: None,
        })
    }

    fn clip() -> AudioClip {
        AudioClip {
            sample_rate_hz: 16_000,
            samples: vec![0.0; 160],
        }
    }

    #[test]
    fn audio_runs_through_the_frontend() {
        let engine = evaluator(Arc::new(HashedBagOfWords::default()), Some(Arc::new(EchoFrontend)));
        let request = EvaluationRequest {
            exercise: ExerciseType::RepeatSentence,
            reference: "the cat sat on the mat".to_string(),
            response: Some(Response::Audio { clip: clip() }),
            key_phrases: Vec::new(),
        };
        let report = engine.evaluate(&request).expect("report");
        assert!(!report.is_degraded());
        assert_eq!(report.score(Criterion::Content), Some(90.0));
        assert!(report.score(Criterion::Pronunciation).is_some());
        assert!(report.composite(Composite::Speaking).is_some());
    }

    #[test]
    fn missing_frontend_degrades_to_minimum() {
        let engine = evaluator(Arc::new(HashedBagOfWords::default()), None);
        let request = EvaluationRequest {
            exercise: ExerciseType::RetellLecture,
            reference: "Rivers shaped early cities.".to_string(),
            response: Some(Response::Audio { clip: clip() }),
            key_phrases: Vec::new(),
        };
        let report = engine.evaluate(&request).expect("report");
        assert!(report.is_degraded());
        assert_eq!(report.score(Criterion::Content), Some(10.0));
        assert_eq!(report.score(Criterion::Pronunciation), Some(MIN_SCORE));
        assert_eq!(report.score(Criterion::Fluency), Some(MIN_SCORE));
    }

    #[test]
    fn embedder_failure_floors_content_and_gates_acoustics() {
        let engine = evaluator(Arc::new(BrokenEmbedder), None);
        let features = AcousticFeatures::from_measurements(
            "rivers gave the first cities water food and trade routes across the valley",
            5.0,
            32.0,
        );
        let request = EvaluationRequest::speech(
            ExerciseType::RetellLecture,
            "Rivers supplied the first cities with water, food and trade routes.",
            features,
        );
        let report = engine.evaluate(&request).expect("report");
        assert!(report.is_degraded());
        assert_eq!(report.score(Criterion::Content), Some(10.0));
        assert_eq!(report.score(Criterion::Pronunciation), Some(10.0));
        assert_eq!(report.score(Criterion::Fluency), Some(10.0));
        assert!(report.detail("errors").is_some());
    }

    #[test]
    fn written_total_sums_criteria() {
        let engine = evaluator(Arc::new(HashedBagOfWords::default()), None);
        let request = EvaluationRequest::text(
            ExerciseType::SummarizeWrittenText,
            "Urban gardens reduce heat in cities. They also give residents fresh food and a place to meet.",
            "Urban gardens cool cities, provide fresh food and create meeting places for residents.",
        );
        let report = engine.evaluate(&request).expect("report");
        let parts: f64 = [
            Criterion::Content,
            Criterion::Form,
            Criterion::Grammar,
            Criterion::Spelling,
            Criterion::Vocabulary,
        ]
        .iter()
        .map(|&c| report.score(c).expect("scored"))
        .sum();
        assert_eq!(report.score(Criterion::Total), Some(parts));
        assert_eq!(report.word_highlights().len(), 13);
    }

    #[test]
    fn text_for_speech_exercise_is_rejected() {
        let engine = evaluator(Arc::new(HashedBagOfWords::default()), None);
        let request = EvaluationRequest::text(ExerciseType::ReadAloud, "Read this.", "read this");
        let err = engine.evaluate(&request).expect_err("wrong kind");
        assert!(err.is_input_error());
    }
}
