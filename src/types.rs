use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::text::{count_syllables, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    ReadAloud,
    RepeatSentence,
    RetellLecture,
    RespondSituation,
    SummarizeGroup,
    SummarizeSpokenText,
    SummarizeWrittenText,
    WriteEssay,
    WriteFromDictation,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 9] = [
        Self::ReadAloud,
        Self::RepeatSentence,
        Self::RetellLecture,
        Self::RespondSituation,
        Self::SummarizeGroup,
        Self::SummarizeSpokenText,
        Self::SummarizeWrittenText,
        Self::WriteEssay,
        Self::WriteFromDictation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadAloud => "read_aloud",
            Self::RepeatSentence => "repeat_sentence",
            Self::RetellLecture => "retell_lecture",
            Self::RespondSituation => "respond_situation",
            Self::SummarizeGroup => "summarize_group",
            Self::SummarizeSpokenText => "summarize_spoken_text",
            Self::SummarizeWrittenText => "summarize_written_text",
            Self::WriteEssay => "write_essay",
            Self::WriteFromDictation => "write_from_dictation",
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appeared in the input, punctuation included.
    pub text: String,
    pub normalized: String,
    pub position: usize,
}

/// Measurements of one spoken response. Produced by a speech frontend or
/// supplied directly by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticFeatures {
    pub transcript: String,
    pub duration_sec: f64,
    /// Syllables per second.
    pub speech_rate: f64,
    /// Standard deviation of pitch, in Hz.
    pub intonation_std: f64,
    pub syllable_count: u32,
}

impl AcousticFeatures {
    /// Derives syllable count and speech rate from the transcript.
    pub fn from_measurements(
        transcript: impl Into<String>,
        duration_sec: f64,
        intonation_std: f64,
    ) -> Self {
        let transcript = transcript.into();
        let syllable_count = count_syllables(&transcript);
        let speech_rate = if duration_sec > 0.0 {
            syllable_count as f64 / duration_sec
        } else {
            0.0
        };
        Self {
            transcript,
            duration_sec,
            speech_rate,
            intonation_std,
            syllable_count,
        }
    }

    pub fn from_raw(transcript: impl Into<String>, raw: &RawAcoustics) -> Self {
        let mut features =
            Self::from_measurements(transcript, raw.duration_sec, raw.intonation_std);
        if let Some(syllables) = raw.syllable_count {
            features.syllable_count = syllables;
        }
        if let Some(rate) = raw.speech_rate {
            features.speech_rate = rate;
        } else if raw.syllable_count.is_some() && raw.duration_sec > 0.0 {
            features.speech_rate = features.syllable_count as f64 / raw.duration_sec;
        }
        features
    }

    pub fn word_count(&self) -> usize {
        tokenize(&self.transcript).len()
    }

    pub(crate) fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in [
            ("duration_sec", self.duration_sec),
            ("speech_rate", self.speech_rate),
            ("intonation_std", self.intonation_std),
        ] {
            if !value.is_finite() {
                return Err(ScoreError::invalid_input(format!(
                    "acoustic feature {name} is not finite"
                )));
            }
            if value < 0.0 {
                return Err(ScoreError::invalid_input(format!(
                    "acoustic feature {name} is negative ({value})"
                )));
            }
        }
        Ok(())
    }
}

/// Low-level measurements returned by a speech frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAcoustics {
    pub duration_sec: f64,
    pub intonation_std: f64,
    #[serde(default)]
    pub syllable_count: Option<u32>,
    #[serde(default)]
    pub speech_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Grammar,
    Typographical,
    Spelling,
    Style,
}

/// One finding from a grammar/spell checker. `offset` and `length` count
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextIssue {
    pub category: IssueCategory,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub replacements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStatus {
    Correct,
    Substituted,
    Missing,
    Extra,
    Misspelled,
    Grammar,
    Spelling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordHighlight {
    pub word: String,
    pub status: HighlightStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_index: Option<usize>,
}

impl WordHighlight {
    pub(crate) fn new(word: impl Into<String>, status: HighlightStatus) -> Self {
        Self {
            word: word.into(),
            status,
            replacement: None,
            suggestions: Vec::new(),
            reference_index: None,
            response_index: None,
        }
    }

    pub(crate) fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub(crate) fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub(crate) fn at_reference(mut self, index: usize) -> Self {
        self.reference_index = Some(index);
        self
    }

    pub(crate) fn at_response(mut self, index: usize) -> Self {
        self.response_index = Some(index);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Text,
    Speech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Response {
    Text { text: String },
    Speech { features: AcousticFeatures },
    Audio { clip: AudioClip },
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Text { .. } => ResponseKind::Text,
            Self::Speech { .. } | Self::Audio { .. } => ResponseKind::Speech,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub exercise: ExerciseType,
    pub reference: String,
    #[serde(default)]
    pub response: Option<Response>,
    /// Overrides the profile's key phrases for keyword-coverage rubrics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_phrases: Vec<String>,
}

impl EvaluationRequest {
    pub fn text(exercise: ExerciseType, reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            exercise,
            reference: reference.into(),
            response: Some(Response::Text { text: text.into() }),
            key_phrases: Vec::new(),
        }
    }

    pub fn speech(
        exercise: ExerciseType,
        reference: impl Into<String>,
        features: AcousticFeatures,
    ) -> Self {
        Self {
            exercise,
            reference: reference.into(),
            response: Some(Response::Speech { features }),
            key_phrases: Vec::new(),
        }
    }
}
