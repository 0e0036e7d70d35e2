//! Per-exercise configuration of the scoring engine.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Composite, CompositeBlend, ContentGate, Criterion};
use crate::alignment::AlignmentMode;
use crate::content::tables::{self, DEFAULT_SITUATION_PHRASES};
use crate::content::{ContentStrategy, KeyIdeaRanking};
use crate::error::ScoreError;
use crate::linguistic::{FormRubric, LinguisticProfile, VocabularyModel};
use crate::rubric::RubricTable;
use crate::types::{ExerciseType, ResponseKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PronunciationModel {
    /// Rate, intonation and syllable density only.
    Acoustic,
    /// Word error rate and syllable accuracy against the script.
    ReferenceAccuracy,
}

/// Everything that differs between exercises. The evaluator runs the same
/// pipeline for all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub exercise: ExerciseType,
    pub accepts: ResponseKind,
    /// Word highlights from aligning the response against the reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentMode>,
    pub content: ContentStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<PronunciationModel>,
    #[serde(default)]
    pub fluency: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<ContentGate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linguistic: Option<LinguisticProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<FormRubric>,
    #[serde(default)]
    pub structure: bool,
    #[serde(default)]
    pub linguistic_range: bool,
    #[serde(default)]
    pub composites: Vec<CompositeBlend>,
    /// Report the sum of written criteria as `total`.
    #[serde(default)]
    pub include_total: bool,
    #[serde(default)]
    pub key_phrases: Vec<String>,
}

impl ExerciseProfile {
    fn spoken(exercise: ExerciseType, content: ContentStrategy) -> Self {
        Self {
            exercise,
            accepts: ResponseKind::Speech,
            alignment: None,
            content,
            pronunciation: Some(PronunciationModel::Acoustic),
            fluency: true,
            gate: Some(ContentGate::standard()),
            linguistic: None,
            form: None,
            structure: false,
            linguistic_range: false,
            composites: vec![
                CompositeBlend::new(
                    Composite::Speaking,
                    &[(Criterion::Fluency, 0.8), (Criterion::Pronunciation, 0.2)],
                ),
                CompositeBlend::new(
                    Composite::Listening,
                    &[(Criterion::Content, 0.8), (Criterion::Pronunciation, 0.2)],
                ),
            ],
            include_total: false,
            key_phrases: Vec::new(),
        }
    }

    fn written(
        exercise: ExerciseType,
        table: RubricTable,
        key_ideas: KeyIdeaRanking,
        linguistic: LinguisticProfile,
        form: FormRubric,
    ) -> Self {
        Self {
            exercise,
            accepts: ResponseKind::Text,
            alignment: None,
            content: ContentStrategy::Cascade { table, key_ideas },
            pronunciation: None,
            fluency: false,
            gate: None,
            linguistic: Some(linguistic),
            form: Some(form),
            structure: false,
            linguistic_range: false,
            composites: Vec::new(),
            include_total: true,
            key_phrases: Vec::new(),
        }
    }

    /// Built-in configuration for `exercise`.
    pub fn builtin(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::ReadAloud => Self {
                alignment: Some(AlignmentMode::Opcode),
                pronunciation: Some(PronunciationModel::ReferenceAccuracy),
                gate: Some(ContentGate::floor_only()),
                composites: vec![
                    CompositeBlend::new(
                        Composite::Speaking,
                        &[(Criterion::Fluency, 0.8), (Criterion::Pronunciation, 0.2)],
                    ),
                    CompositeBlend::new(
                        Composite::Reading,
                        &[(Criterion::Content, 0.8), (Criterion::Fluency, 0.2)],
                    ),
                ],
                ..Self::spoken(exercise, ContentStrategy::WordAccuracy { min_accuracy: 0.6 })
            },
            ExerciseType::RepeatSentence => Self {
                alignment: Some(AlignmentMode::Opcode),
                gate: Some(ContentGate::floor_only()),
                ..Self::spoken(exercise, ContentStrategy::SequenceMatch)
            },
            ExerciseType::RetellLecture => Self::spoken(
                exercise,
                ContentStrategy::CoverageBlend {
                    key_terms: 10,
                    coverage_weight: 0.65,
                    similarity_weight: 0.35,
                },
            ),
            ExerciseType::RespondSituation => Self {
                key_phrases: DEFAULT_SITUATION_PHRASES.iter().map(|p| p.to_string()).collect(),
                ..Self::spoken(
                    exercise,
                    ContentStrategy::Cascade {
                        table: tables::respond_situation(),
                        key_ideas: KeyIdeaRanking::Salience,
                    },
                )
            },
            ExerciseType::SummarizeGroup => Self::spoken(exercise, ContentStrategy::GroupCoverage),
            ExerciseType::SummarizeSpokenText => Self::written(
                exercise,
                tables::summarize_spoken(),
                KeyIdeaRanking::Salience,
                LinguisticProfile::summary(VocabularyModel::Profile),
                FormRubric::summarize_spoken(),
            ),
            ExerciseType::SummarizeWrittenText => Self::written(
                exercise,
                tables::summarize_written(),
                KeyIdeaRanking::Salience,
                LinguisticProfile::summary(VocabularyModel::summary_diversity()),
                FormRubric::summarize_written(),
            ),
            ExerciseType::WriteEssay => Self {
                structure: true,
                linguistic_range: true,
                ..Self::written(
                    exercise,
                    tables::essay(),
                    KeyIdeaRanking::DiscourseMarkers,
                    LinguisticProfile::essay(),
                    FormRubric::essay(),
                )
            },
            ExerciseType::WriteFromDictation => Self {
                exercise,
                accepts: ResponseKind::Text,
                alignment: Some(AlignmentMode::Greedy),
                content: ContentStrategy::Dictation,
                pronunciation: None,
                fluency: false,
                gate: None,
                linguistic: None,
                form: None,
                structure: false,
                linguistic_range: false,
                composites: vec![
                    CompositeBlend::new(Composite::Listening, &[(Criterion::Content, 1.0)]),
                    CompositeBlend::new(Composite::Writing, &[(Criterion::Content, 1.0)]),
                ],
                include_total: false,
                key_phrases: Vec::new(),
            },
        }
    }

    fn validate(&self) -> Result<(), ScoreError> {
        if let ContentStrategy::Cascade { table, .. } = &self.content {
            table.validate()?;
        }
        let needs_speech = self.pronunciation.is_some() || self.fluency;
        if needs_speech && self.accepts != ResponseKind::Speech {
            return Err(ScoreError::config(format!(
                "{} scores pronunciation or fluency but accepts text",
                self.exercise
            )));
        }
        for blend in &self.composites {
            if blend.terms.iter().any(|term| !term.weight.is_finite()) {
                return Err(ScoreError::config(format!(
                    "{} has a non-finite composite weight",
                    self.exercise
                )));
            }
        }
        Ok(())
    }
}

/// The profile used for every exercise, built-ins unless overridden.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSet {
    profiles: BTreeMap<ExerciseType, ExerciseProfile>,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileSet {
    pub fn builtin() -> Self {
        let profiles = ExerciseType::ALL
            .iter()
            .map(|&exercise| (exercise, ExerciseProfile::builtin(exercise)))
            .collect();
        Self { profiles }
    }

    /// Built-in profiles with the ones listed in a JSON array file replaced.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let raw = fs::read_to_string(path).map_err(|e| ScoreError::io("read profile overrides", e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoreError> {
        let overrides: Vec<ExerciseProfile> =
            serde_json::from_str(raw).map_err(|e| ScoreError::json("parse profile overrides", e))?;
        let mut set = Self::builtin();
        for profile in overrides {
            set.insert(profile)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, profile: ExerciseProfile) -> Result<(), ScoreError> {
        profile.validate()?;
        tracing::debug!(exercise = %profile.exercise, "installed exercise profile override");
        self.profiles.insert(profile.exercise, profile);
        Ok(())
    }

    pub fn get(&self, exercise: ExerciseType) -> Option<&ExerciseProfile> {
        self.profiles.get(&exercise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_exercise_has_a_valid_builtin() {
        let set = ProfileSet::builtin();
        for exercise in ExerciseType::ALL {
            let profile = set.get(exercise).expect("builtin profile");
            assert_eq!(profile.exercise, exercise);
            profile.validate().expect("builtin profile must validate");
        }
    }

    #[test]
    fn profiles_round_trip_through_json() {
        let essay = ExerciseProfile::builtin(ExerciseType::WriteEssay);
        let json = serde_json::to_string(&vec![essay.clone()]).expect("serialize");
        let set = ProfileSet::from_json(&json).expect("parse");
        let parsed = set.get(ExerciseType::WriteEssay).expect("essay");
        assert!(parsed.structure && parsed.linguistic_range && parsed.include_total);
        match &parsed.content {
            ContentStrategy::Cascade { table, key_ideas } => {
                assert_eq!(table.max_level(), 6);
                assert_eq!(*key_ideas, KeyIdeaRanking::DiscourseMarkers);
            }
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_only_their_exercise() {
        let json = r#"[{
            "exercise": "summarize_written_text",
            "accepts": "text",
            "content": {
                "strategy": "cascade",
                "table": {
                    "rules": [{"level": 1, "all_of": [{"signal": "similarity", "bound": {"at_least": 0.5}}]}],
                    "floor": {"level": 0}
                }
            },
            "include_total": true
        }]"#;
        let set = ProfileSet::from_json(json).expect("override");
        let swt = set.get(ExerciseType::SummarizeWrittenText).expect("swt");
        assert!(swt.linguistic.is_none());
        assert_eq!(
            set.get(ExerciseType::WriteEssay),
            Some(&ExerciseProfile::builtin(ExerciseType::WriteEssay))
        );
    }

    #[test]
    fn invalid_tables_are_rejected() {
        let json = r#"[{
            "exercise": "write_essay",
            "accepts": "text",
            "content": {
                "strategy": "cascade",
                "table": {
                    "rules": [{"level": 1}, {"level": 2}],
                    "floor": {"level": 0}
                }
            }
        }]"#;
        assert!(ProfileSet::from_json(json).is_err());
    }

    #[test]
    fn acoustic_criteria_require_speech() {
        let mut profile = ExerciseProfile::builtin(ExerciseType::RetellLecture);
        profile.accepts = ResponseKind::Text;
        assert!(ProfileSet::builtin().insert(profile).is_err());
    }
}
