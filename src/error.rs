use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },
    #[error("{stage} did not finish within {timeout_ms} ms")]
    Timeout { stage: &'static str, timeout_ms: u64 },
    #[error("invalid configuration: {message}")]
    Config { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl ScoreError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    /// Collaborator implementations live outside this crate, so this one is public.
    pub fn collaborator(collaborator: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            collaborator,
            message: err.to_string(),
        }
    }

    pub(crate) fn timeout(stage: &'static str, timeout_ms: u64) -> Self {
        Self::Timeout { stage, timeout_ms }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Input errors are returned to the caller; everything else degrades the report.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
