//! Content gating of acoustic scores and composite blends.

use serde::{Deserialize, Serialize};

use crate::text::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Content,
    Pronunciation,
    Fluency,
    Grammar,
    Spelling,
    Vocabulary,
    Form,
    Structure,
    LinguisticRange,
    Total,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Pronunciation => "pronunciation",
            Self::Fluency => "fluency",
            Self::Grammar => "grammar",
            Self::Spelling => "spelling",
            Self::Vocabulary => "vocabulary",
            Self::Form => "form",
            Self::Structure => "structure",
            Self::LinguisticRange => "linguistic_range",
            Self::Total => "total",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composite {
    Speaking,
    Listening,
    Reading,
    Writing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateBand {
    pub min_content: f64,
    pub multiplier: f64,
}

/// Scales pronunciation and fluency by how well the content was carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentGate {
    /// Checked in order; the first band whose minimum the content meets wins.
    pub bands: Vec<GateBand>,
    pub fallback_multiplier: f64,
    /// Content at or below this forces both scores to `floor`.
    pub minimum_content: f64,
    pub floor: f64,
}

impl ContentGate {
    pub fn standard() -> Self {
        let band = |min_content, multiplier| GateBand {
            min_content,
            multiplier,
        };
        Self {
            bands: vec![band(80.0, 1.0), band(60.0, 0.9), band(40.0, 0.7), band(20.0, 0.5)],
            fallback_multiplier: 0.3,
            minimum_content: 10.0,
            floor: 10.0,
        }
    }

    /// Only the minimum-content rule, no multipliers.
    pub fn floor_only() -> Self {
        Self {
            bands: Vec::new(),
            fallback_multiplier: 1.0,
            minimum_content: 10.0,
            floor: 10.0,
        }
    }

    pub fn multiplier(&self, content: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| content >= band.min_content)
            .map_or(self.fallback_multiplier, |band| band.multiplier)
    }

    pub fn apply(&self, content: f64, pronunciation: f64, fluency: f64) -> GatedScores {
        let multiplier = self.multiplier(content);
        let forced_floor = content <= self.minimum_content;
        let gate = |score: f64| {
            if forced_floor {
                self.floor
            } else {
                round2(score * multiplier).max(self.floor)
            }
        };
        GatedScores {
            multiplier,
            forced_floor,
            original_pronunciation: pronunciation,
            original_fluency: fluency,
            pronunciation: gate(pronunciation),
            fluency: gate(fluency),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GatedScores {
    pub multiplier: f64,
    pub forced_floor: bool,
    pub original_pronunciation: f64,
    pub original_fluency: f64,
    pub pronunciation: f64,
    pub fluency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendTerm {
    pub criterion: Criterion,
    pub weight: f64,
}

/// A composite score as a fixed weighted sum of criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBlend {
    pub composite: Composite,
    pub terms: Vec<BlendTerm>,
}

impl CompositeBlend {
    pub fn new(composite: Composite, terms: &[(Criterion, f64)]) -> Self {
        Self {
            composite,
            terms: terms
                .iter()
                .map(|&(criterion, weight)| BlendTerm { criterion, weight })
                .collect(),
        }
    }

    /// `None` when a blended criterion was not scored.
    pub fn evaluate(&self, score_of: impl Fn(Criterion) -> Option<f64>) -> Option<f64> {
        let mut total = 0.0;
        for term in &self.terms {
            total += score_of(term.criterion)? * term.weight;
        }
        Some(round2(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_bands() {
        let gate = ContentGate::standard();
        assert_eq!(gate.multiplier(85.0), 1.0);
        assert_eq!(gate.multiplier(80.0), 1.0);
        assert_eq!(gate.multiplier(65.0), 0.9);
        assert_eq!(gate.multiplier(45.0), 0.7);
        assert_eq!(gate.multiplier(20.0), 0.5);
        assert_eq!(gate.multiplier(19.99), 0.3);
    }

    #[test]
    fn minimum_content_forces_floor() {
        let gated = ContentGate::standard().apply(10.0, 80.0, 75.0);
        assert!(gated.forced_floor);
        assert_eq!(gated.pronunciation, 10.0);
        assert_eq!(gated.fluency, 10.0);

        let only_floor = ContentGate::floor_only().apply(10.0, 80.0, 75.0);
        assert_eq!(only_floor.pronunciation, 10.0);
    }

    #[test]
    fn gated_scores_never_drop_below_floor() {
        let gated = ContentGate::standard().apply(15.0, 20.0, 30.0);
        assert_eq!(gated.multiplier, 0.3);
        assert_eq!(gated.pronunciation, 10.0);
        assert_eq!(gated.fluency, 10.0);

        let mid = ContentGate::standard().apply(62.0, 70.0, 50.0);
        assert_eq!(mid.pronunciation, 63.0);
        assert_eq!(mid.fluency, 45.0);
    }

    #[test]
    fn blends_need_every_term() {
        let speaking = CompositeBlend::new(
            Composite::Speaking,
            &[(Criterion::Fluency, 0.8), (Criterion::Pronunciation, 0.2)],
        );
        let score = speaking.evaluate(|criterion| match criterion {
            Criterion::Fluency => Some(60.0),
            Criterion::Pronunciation => Some(40.0),
            _ => None,
        });
        assert_eq!(score, Some(56.0));
        assert_eq!(speaking.evaluate(|_| None), None);
    }
}
