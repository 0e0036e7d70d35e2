use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::ScoreError;
use crate::pipeline::defaults::{HashedBagOfWords, NoIssueChecker};
use crate::pipeline::runtime::{Evaluator, EvaluatorParts};
use crate::pipeline::traits::{Embedder, SpeechFrontend, TextChecker};
use crate::profile::ProfileSet;

pub struct EvaluatorBuilder {
    config: EngineConfig,
    profiles: Option<ProfileSet>,
    embedder: Option<Arc<dyn Embedder>>,
    text_checker: Option<Arc<dyn TextChecker>>,
    speech_frontend: Option<Arc<dyn SpeechFrontend>>,
}

impl EvaluatorBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            profiles: None,
            embedder: None,
            text_checker: None,
            speech_frontend: None,
        }
    }

    /// Replaces the profiles that `EngineConfig::profile_path` would load.
    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_text_checker(mut self, text_checker: Arc<dyn TextChecker>) -> Self {
        self.text_checker = Some(text_checker);
        self
    }

    pub fn with_speech_frontend(mut self, speech_frontend: Arc<dyn SpeechFrontend>) -> Self {
        self.speech_frontend = Some(speech_frontend);
        self
    }

    pub fn build(self) -> Result<Evaluator, ScoreError> {
        let profiles = match self.profiles {
            Some(profiles) => profiles,
            None => self.config.profiles()?,
        };
        if self.speech_frontend.is_none() {
            tracing::debug!("no speech frontend configured; audio responses will be degraded");
        }

        Ok(Evaluator::from_parts(EvaluatorParts {
            profiles,
            embedder: self
                .embedder
                .unwrap_or_else(|| Arc::new(HashedBagOfWords::default())),
            text_checker: self
                .text_checker
                .unwrap_or_else(|| Arc::new(NoIssueChecker)),
            speech_frontend: self.speech_frontend,
            collaborator_timeout: self.config.collaborator_timeout(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::aggregate::Criterion;
    use crate::types::{EvaluationRequest, ExerciseType};

    #[test]
    fn build_with_defaults() {
        let evaluator = EvaluatorBuilder::new(EngineConfig::default())
            .build()
            .expect("builtin profiles");
        let report = evaluator
            .evaluate(&EvaluationRequest::text(
                ExerciseType::WriteFromDictation,
                "The lecture starts at nine.",
                "The lecture starts at nine.",
            ))
            .expect("report");
        assert_eq!(report.score(Criterion::Content), Some(5.0));
    }

    #[test]
    fn build_fails_on_missing_profile_file() {
        let config = EngineConfig {
            collaborator_timeout_ms: None,
            profile_path: Some(PathBuf::from("/nonexistent/rubric-profiles.json")),
        };
        assert!(EvaluatorBuilder::new(config).build().is_err());
    }

    #[test]
    fn explicit_profiles_skip_the_profile_file() {
        let config = EngineConfig {
            collaborator_timeout_ms: Some(50),
            profile_path: Some(PathBuf::from("/nonexistent/rubric-profiles.json")),
        };
        let evaluator = EvaluatorBuilder::new(config)
            .with_profiles(ProfileSet::builtin())
            .build()
            .expect("profiles supplied directly");
        assert!(evaluator.profiles().get(ExerciseType::WriteEssay).is_some());
    }

    #[test]
    fn profile_overrides_load_from_disk() {
        let path = std::env::temp_dir().join("rubric_rs_builder_profiles.json");
        let essay = crate::profile::ExerciseProfile {
            include_total: false,
            ..crate::profile::ExerciseProfile::builtin(ExerciseType::WriteEssay)
        };
        let json = serde_json::to_string(&vec![essay]).expect("serialize");
        std::fs::write(&path, json).expect("write profiles");

        let config = EngineConfig {
            collaborator_timeout_ms: None,
            profile_path: Some(path.clone()),
        };
        let evaluator = EvaluatorBuilder::new(config).build().expect("build");
        let essay = evaluator.profiles().get(ExerciseType::WriteEssay).expect("essay");
        assert!(!essay.include_total);
        let _ = std::fs::remove_file(&path);
    }
}
