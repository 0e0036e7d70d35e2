//! Grammar, spelling and vocabulary scores with their cross-penalties.

pub mod form;
pub mod highlights;
pub mod vocabulary;

use serde::{Deserialize, Serialize};

use crate::types::{IssueCategory, TextIssue};

pub use form::{FormAssessment, FormRubric};
pub use vocabulary::{VocabularyMetrics, VocabularyModel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueCounts {
    /// Grammar and typographical issues.
    pub grammar: usize,
    pub spelling: usize,
}

impl IssueCounts {
    pub fn tally(issues: &[TextIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.category {
                IssueCategory::Grammar | IssueCategory::Typographical => counts.grammar += 1,
                IssueCategory::Spelling => counts.spelling += 1,
                IssueCategory::Style => {}
            }
            counts
        })
    }
}

/// Each criterion is worth 0–2 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinguisticScores {
    pub grammar: u8,
    pub spelling: u8,
    pub vocabulary: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PenaltyBreakdown {
    pub grammar_to_spelling: u8,
    pub grammar_to_vocabulary: u8,
    pub spelling_to_grammar: u8,
    pub spelling_to_vocabulary: u8,
}

fn penalty(count: usize, trigger: usize, base: u8) -> u8 {
    if count < trigger {
        return 0;
    }
    let excess = count - (trigger - 1);
    excess.min(base as usize) as u8
}

/// Cross-criterion penalties, computed from `base` only so no penalty feeds
/// another:
///
/// - 3+ grammar issues cost spelling `issues - 2`; 5+ cost vocabulary `issues - 4`
/// - 3+ spelling issues cost grammar `issues - 2`; 5+ cost vocabulary `issues - 4`
///
/// Each deduction is capped at the affected base score.
pub fn apply_penalties(base: LinguisticScores, counts: IssueCounts) -> (LinguisticScores, PenaltyBreakdown) {
    let breakdown = PenaltyBreakdown {
        grammar_to_spelling: penalty(counts.grammar, 3, base.spelling),
        grammar_to_vocabulary: penalty(counts.grammar, 5, base.vocabulary),
        spelling_to_grammar: penalty(counts.spelling, 3, base.grammar),
        spelling_to_vocabulary: penalty(counts.spelling, 5, base.vocabulary),
    };
    let scores = LinguisticScores {
        grammar: base.grammar.saturating_sub(breakdown.spelling_to_grammar),
        spelling: base.spelling.saturating_sub(breakdown.grammar_to_spelling),
        vocabulary: base
            .vocabulary
            .saturating_sub(breakdown.grammar_to_vocabulary)
            .saturating_sub(breakdown.spelling_to_vocabulary),
    };
    (scores, breakdown)
}

pub fn grammar_points(issues: usize, max_for_one_point: usize) -> u8 {
    match issues {
        0 => 2,
        n if n <= max_for_one_point => 1,
        _ => 0,
    }
}

pub fn spelling_points(issues: usize) -> u8 {
    match issues {
        0 => 2,
        1 => 1,
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticProfile {
    /// Most grammar issues that still earn one point.
    pub max_grammar_issues_for_one_point: usize,
    pub vocabulary: VocabularyModel,
}

impl LinguisticProfile {
    pub fn summary(vocabulary: VocabularyModel) -> Self {
        Self {
            max_grammar_issues_for_one_point: 2,
            vocabulary,
        }
    }

    pub fn essay() -> Self {
        Self {
            max_grammar_issues_for_one_point: 1,
            vocabulary: VocabularyModel::essay_diversity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinguisticAssessment {
    pub base: LinguisticScores,
    pub scores: LinguisticScores,
    pub counts: IssueCounts,
    pub penalties: PenaltyBreakdown,
    pub vocabulary: VocabularyMetrics,
    pub grammar_messages: Vec<String>,
    pub spelling_messages: Vec<String>,
}

pub fn score_linguistic(text: &str, issues: &[TextIssue], profile: &LinguisticProfile) -> LinguisticAssessment {
    let counts = IssueCounts::tally(issues);
    let (vocabulary_points, vocabulary) = vocabulary::score_vocabulary(text, &profile.vocabulary);
    let base = LinguisticScores {
        grammar: grammar_points(counts.grammar, profile.max_grammar_issues_for_one_point),
        spelling: spelling_points(counts.spelling),
        vocabulary: vocabulary_points,
    };
    let (scores, penalties) = apply_penalties(base, counts);
    if penalties != PenaltyBreakdown::default() {
        tracing::debug!(
            grammar_issues = counts.grammar,
            spelling_issues = counts.spelling,
            ?penalties,
            "applied linguistic cross-penalties"
        );
    }

    let messages = |wanted: &[IssueCategory]| -> Vec<String> {
        issues
            .iter()
            .filter(|issue| wanted.contains(&issue.category))
            .map(|issue| issue.message.clone())
            .collect()
    };
    LinguisticAssessment {
        base,
        scores,
        counts,
        penalties,
        vocabulary,
        grammar_messages: messages(&[IssueCategory::Grammar, IssueCategory::Typographical]),
        spelling_messages: messages(&[IssueCategory::Spelling]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues(category: IssueCategory, count: usize) -> Vec<TextIssue> {
        (0..count)
            .map(|idx| TextIssue {
                category,
                offset: idx,
                length: 1,
                message: format!("issue {idx}"),
                replacements: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn bands_follow_issue_counts() {
        assert_eq!(grammar_points(0, 2), 2);
        assert_eq!(grammar_points(2, 2), 1);
        assert_eq!(grammar_points(2, 1), 0);
        assert_eq!(spelling_points(1), 1);
        assert_eq!(spelling_points(2), 0);
    }

    #[test]
    fn six_grammar_issues_cap_penalties_at_base_scores() {
        let base = LinguisticScores {
            grammar: 0,
            spelling: 2,
            vocabulary: 2,
        };
        let counts = IssueCounts {
            grammar: 6,
            spelling: 0,
        };
        let (scores, breakdown) = apply_penalties(base, counts);
        assert_eq!(breakdown.grammar_to_vocabulary, 2);
        assert_eq!(breakdown.grammar_to_spelling, 2);
        assert_eq!(scores.vocabulary, 0);
        assert_eq!(scores.spelling, 0);
        assert_eq!(scores.grammar, 0);
    }

    #[test]
    fn penalties_use_base_scores_only() {
        // spelling loses to grammar and grammar loses to spelling, each from base
        let base = LinguisticScores {
            grammar: 2,
            spelling: 2,
            vocabulary: 1,
        };
        let counts = IssueCounts {
            grammar: 3,
            spelling: 3,
        };
        let (scores, breakdown) = apply_penalties(base, counts);
        assert_eq!(breakdown.grammar_to_spelling, 1);
        assert_eq!(breakdown.spelling_to_grammar, 1);
        assert_eq!((scores.grammar, scores.spelling, scores.vocabulary), (1, 1, 1));
    }

    #[test]
    fn style_issues_are_ignored() {
        let mut all = issues(IssueCategory::Style, 4);
        all.extend(issues(IssueCategory::Typographical, 1));
        all.extend(issues(IssueCategory::Spelling, 1));
        let counts = IssueCounts::tally(&all);
        assert_eq!(counts, IssueCounts { grammar: 1, spelling: 1 });
    }

    #[test]
    fn assessment_collects_messages() {
        let profile = LinguisticProfile::summary(VocabularyModel::summary_diversity());
        let found = issues(IssueCategory::Grammar, 6);
        let assessment = score_linguistic("Cities grow quickly.", &found, &profile);
        assert_eq!(assessment.base.grammar, 0);
        assert_eq!(assessment.scores.spelling, 0);
        assert_eq!(assessment.grammar_messages.len(), 6);
        assert!(assessment.spelling_messages.is_empty());
    }
}
