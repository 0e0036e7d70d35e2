use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::aggregate::{Composite, Criterion};
use crate::types::{ExerciseType, WordHighlight};

/// Result of one evaluation. Assembled by the evaluator and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    exercise: ExerciseType,
    scores: BTreeMap<Criterion, f64>,
    composites: BTreeMap<Composite, f64>,
    word_highlights: Vec<WordHighlight>,
    details: Map<String, Value>,
    degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl ScoreReport {
    pub(crate) fn new(exercise: ExerciseType) -> Self {
        Self {
            exercise,
            scores: BTreeMap::new(),
            composites: BTreeMap::new(),
            word_highlights: Vec::new(),
            details: Map::new(),
            degraded: false,
            warnings: Vec::new(),
        }
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn score(&self, criterion: Criterion) -> Option<f64> {
        self.scores.get(&criterion).copied()
    }

    pub fn scores(&self) -> &BTreeMap<Criterion, f64> {
        &self.scores
    }

    pub fn composite(&self, composite: Composite) -> Option<f64> {
        self.composites.get(&composite).copied()
    }

    pub fn composites(&self) -> &BTreeMap<Composite, f64> {
        &self.composites
    }

    pub fn word_highlights(&self) -> &[WordHighlight] {
        &self.word_highlights
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// True when a collaborator failed and some criteria fell back to defaults.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn set_score(&mut self, criterion: Criterion, value: f64) {
        self.scores.insert(criterion, value);
    }

    pub(crate) fn set_composite(&mut self, composite: Composite, value: f64) {
        self.composites.insert(composite, value);
    }

    pub(crate) fn set_highlights(&mut self, highlights: Vec<WordHighlight>) {
        self.word_highlights = highlights;
    }

    pub(crate) fn insert_detail(&mut self, key: &str, value: Value) {
        self.details.insert(key.to_string(), value);
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Marks the report degraded and records which collaborator failed.
    pub(crate) fn degrade(&mut self, stage: &str, error: impl std::fmt::Display) {
        self.degraded = true;
        let message = format!("{stage}: {error}");
        let errors = self
            .details
            .entry("errors".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = errors {
            list.push(Value::String(message.clone()));
        }
        self.warnings.push(message);
    }
}
