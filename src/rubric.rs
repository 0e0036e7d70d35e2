//! Ordered threshold cascades.
//!
//! A [`RubricTable`] is a list of rules, highest level first. Each rule is a
//! conjunction of lower bounds on named signals; the first rule whose bounds
//! all hold decides the level. Because every bound is a lower bound on a
//! higher-is-better signal and levels strictly descend, raising any signal
//! can never lower the outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Similarity,
    IdeaCoverage,
    Paraphrase,
    /// `1 - copying`.
    Originality,
    ConnectorDiversity,
    Synthesis,
    Coherence,
    WordCount,
    KeywordHits,
    ArgumentMarkers,
    ConclusionMarkers,
    SyllableCount,
    IntonationStd,
    /// 1 when the speech rate sits inside the fluent band, else 0.
    FluentRate,
    /// `1 - word error rate`.
    WordAccuracy,
    SyllableAccuracy,
}

/// Signal values for one evaluation. Absent or non-finite values read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalVector(BTreeMap<Signal, f64>);

impl SignalVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, signal: Signal, value: f64) -> Self {
        self.set(signal, value);
        self
    }

    pub fn set(&mut self, signal: Signal, value: f64) {
        self.0.insert(signal, value);
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.0
            .get(&signal)
            .copied()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    AtLeast(f64),
    Above(f64),
}

impl Bound {
    pub fn admits(self, value: f64) -> bool {
        match self {
            Self::AtLeast(min) => value >= min,
            Self::Above(min) => value > min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub signal: Signal,
    pub bound: Bound,
}

impl Threshold {
    pub fn at_least(signal: Signal, min: f64) -> Self {
        Self {
            signal,
            bound: Bound::AtLeast(min),
        }
    }

    pub fn above(signal: Signal, min: f64) -> Self {
        Self {
            signal,
            bound: Bound::Above(min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricRule {
    pub level: u8,
    /// Score awarded at this level; the level itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(default)]
    pub all_of: Vec<Threshold>,
    #[serde(default)]
    pub description: String,
}

impl RubricRule {
    pub fn new(level: u8, description: impl Into<String>) -> Self {
        Self {
            level,
            points: None,
            all_of: Vec::new(),
            description: description.into(),
        }
    }

    pub fn points(mut self, points: f64) -> Self {
        self.points = Some(points);
        self
    }

    pub fn require(mut self, threshold: Threshold) -> Self {
        self.all_of.push(threshold);
        self
    }

    fn awarded(&self) -> f64 {
        self.points.unwrap_or(self.level as f64)
    }

    fn matches(&self, signals: &SignalVector) -> bool {
        self.all_of
            .iter()
            .all(|threshold| threshold.bound.admits(signals.get(threshold.signal)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricOutcome {
    pub level: u8,
    pub points: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RubricTableData {
    rules: Vec<RubricRule>,
    floor: RubricRule,
}

/// Validated cascade. `floor` applies when no rule matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RubricTableData", into = "RubricTableData")]
pub struct RubricTable {
    rules: Vec<RubricRule>,
    floor: RubricRule,
}

impl TryFrom<RubricTableData> for RubricTable {
    type Error = ScoreError;

    fn try_from(data: RubricTableData) -> Result<Self, Self::Error> {
        Self::new(data.rules, data.floor)
    }
}

impl From<RubricTable> for RubricTableData {
    fn from(table: RubricTable) -> Self {
        Self {
            rules: table.rules,
            floor: table.floor,
        }
    }
}

impl RubricTable {
    pub fn new(rules: Vec<RubricRule>, floor: RubricRule) -> Result<Self, ScoreError> {
        let table = Self::builtin(rules, floor);
        table.validate()?;
        Ok(table)
    }

    /// Unvalidated constructor for tables compiled into the crate; every one
    /// of them is checked by a unit test.
    pub(crate) fn builtin(rules: Vec<RubricRule>, floor: RubricRule) -> Self {
        Self { rules, floor }
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.floor.all_of.is_empty() {
            return Err(ScoreError::config("rubric floor must not carry thresholds"));
        }
        let mut previous: Option<&RubricRule> = None;
        for rule in self.rules.iter().chain(std::iter::once(&self.floor)) {
            if let Some(prev) = previous {
                if rule.level >= prev.level {
                    return Err(ScoreError::config(format!(
                        "rubric levels must strictly descend (level {} follows {})",
                        rule.level, prev.level
                    )));
                }
                if rule.awarded() > prev.awarded() {
                    return Err(ScoreError::config(format!(
                        "rubric points must not increase as levels descend (level {})",
                        rule.level
                    )));
                }
            }
            for threshold in &rule.all_of {
                let (Bound::AtLeast(min) | Bound::Above(min)) = threshold.bound;
                if !min.is_finite() {
                    return Err(ScoreError::config(format!(
                        "rubric level {} has a non-finite threshold",
                        rule.level
                    )));
                }
            }
            previous = Some(rule);
        }
        Ok(())
    }

    pub fn classify(&self, signals: &SignalVector) -> RubricOutcome {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(signals))
            .unwrap_or(&self.floor);
        RubricOutcome {
            level: rule.level,
            points: rule.awarded(),
            description: rule.description.clone(),
        }
    }

    pub fn max_level(&self) -> u8 {
        self.rules
            .first()
            .map_or(self.floor.level, |rule| rule.level)
    }

    pub fn min_points(&self) -> f64 {
        self.floor.awarded()
    }

    pub fn max_points(&self) -> f64 {
        self.rules
            .first()
            .map_or(self.floor.awarded(), RubricRule::awarded)
    }

    pub fn floor_outcome(&self) -> RubricOutcome {
        RubricOutcome {
            level: self.floor.level,
            points: self.floor.awarded(),
            description: self.floor.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RubricTable {
        RubricTable::new(
            vec![
                RubricRule::new(2, "strong")
                    .require(Threshold::at_least(Signal::Similarity, 0.85)),
                RubricRule::new(1, "partial")
                    .require(Threshold::at_least(Signal::Similarity, 0.70)),
            ],
            RubricRule::new(0, "weak"),
        )
        .expect("valid table")
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = sample_table();
        let outcome = table.classify(&SignalVector::new().with(Signal::Similarity, 0.9));
        assert_eq!(outcome.level, 2);
        assert_eq!(outcome.description, "strong");
        assert_eq!(table.classify(&SignalVector::new().with(Signal::Similarity, 0.7)).level, 1);
        assert_eq!(table.classify(&SignalVector::new()).level, 0);
        assert_eq!(table.max_level(), 2);
    }

    #[test]
    fn non_finite_signals_read_as_zero() {
        let table = sample_table();
        let outcome = table.classify(&SignalVector::new().with(Signal::Similarity, f64::NAN));
        assert_eq!(outcome.level, 0);
    }

    #[test]
    fn above_is_strict() {
        assert!(!Bound::Above(0.4).admits(0.4));
        assert!(Bound::AtLeast(0.4).admits(0.4));
    }

    #[test]
    fn validation_rejects_ascending_levels() {
        let err = RubricTable::new(
            vec![RubricRule::new(1, "low"), RubricRule::new(2, "high")],
            RubricRule::new(0, "floor"),
        )
        .expect_err("levels ascend");
        assert!(err.to_string().contains("strictly descend"));
    }

    #[test]
    fn validation_rejects_increasing_points() {
        let result = RubricTable::new(
            vec![
                RubricRule::new(2, "a").points(30.0),
                RubricRule::new(1, "b").points(60.0),
            ],
            RubricRule::new(0, "c").points(10.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn tables_load_from_json_and_are_validated() {
        let json = r#"{
            "rules": [
                { "level": 1, "points": 50.0,
                  "all_of": [ { "signal": "word_count", "bound": { "above": 10.0 } } ] }
            ],
            "floor": { "level": 0, "points": 10.0 }
        }"#;
        let table: RubricTable = serde_json::from_str(json).expect("valid table json");
        let outcome = table.classify(&SignalVector::new().with(Signal::WordCount, 11.0));
        assert_eq!(outcome.points, 50.0);

        let bad = r#"{ "rules": [ { "level": 0 } ], "floor": { "level": 0 } }"#;
        assert!(serde_json::from_str::<RubricTable>(bad).is_err());
    }

    #[test]
    fn raising_a_signal_never_lowers_the_level() {
        let table = sample_table();
        let mut last = 0;
        for step in 0..=100 {
            let similarity = step as f64 / 100.0;
            let level = table
                .classify(&SignalVector::new().with(Signal::Similarity, similarity))
                .level;
            assert!(level >= last);
            last = level;
        }
    }
}
