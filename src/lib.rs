pub mod acoustic;
pub mod aggregate;
pub mod alignment;
pub mod config;
pub mod content;
pub mod dictation;
pub mod error;
pub mod linguistic;
pub mod logging;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod rubric;
pub mod text;
pub mod types;

pub use aggregate::{Composite, Criterion};
pub use config::EngineConfig;
pub use error::ScoreError;
pub use pipeline::builder::EvaluatorBuilder;
pub use pipeline::runtime::Evaluator;
pub use pipeline::traits::{Embedder, SpeechFrontend, TextChecker};
pub use profile::{ExerciseProfile, ProfileSet};
pub use report::ScoreReport;
pub use types::{
    AcousticFeatures, AudioClip, EvaluationRequest, ExerciseType, HighlightStatus, RawAcoustics,
    Response, TextIssue, WordHighlight,
};
