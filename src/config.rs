use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ScoreError;
use crate::profile::ProfileSet;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on each embedder, checker or speech-frontend call.
    /// `None` waits indefinitely.
    pub collaborator_timeout_ms: Option<u64>,
    /// JSON array of exercise profiles replacing the built-ins.
    pub profile_path: Option<PathBuf>,
}

impl EngineConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| ScoreError::io("read engine config", e))?;
        serde_json::from_str(&data).map_err(|e| ScoreError::json("parse engine config", e))
    }

    pub fn collaborator_timeout(&self) -> Option<Duration> {
        self.collaborator_timeout_ms.map(Duration::from_millis)
    }

    pub fn profiles(&self) -> Result<ProfileSet, ScoreError> {
        match &self.profile_path {
            Some(path) => ProfileSet::load(path),
            None => Ok(ProfileSet::builtin()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: Some(Self::DEFAULT_TIMEOUT_MS),
            profile_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.collaborator_timeout_ms, Some(EngineConfig::DEFAULT_TIMEOUT_MS));
        assert_eq!(config.collaborator_timeout(), Some(Duration::from_secs(10)));
        assert!(config.profile_path.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"profile_path": "profiles.json"}"#).expect("valid config json");
        assert_eq!(config.collaborator_timeout_ms, Some(EngineConfig::DEFAULT_TIMEOUT_MS));
        assert_eq!(config.profile_path, Some(PathBuf::from("profiles.json")));

        let unbounded: EngineConfig =
            serde_json::from_str(r#"{"collaborator_timeout_ms": null}"#).expect("valid config json");
        assert!(unbounded.collaborator_timeout().is_none());
    }

    #[test]
    fn missing_profile_file_is_io_error() {
        let config = EngineConfig {
            collaborator_timeout_ms: None,
            profile_path: Some(PathBuf::from("/nonexistent/rubric-profiles.json")),
        };
        assert!(matches!(config.profiles(), Err(ScoreError::Io { .. })));
    }
}
