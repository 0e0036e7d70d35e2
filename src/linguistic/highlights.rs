use crate::types::{HighlightStatus, IssueCategory, TextIssue, WordHighlight};

const MAX_SUGGESTIONS: usize = 3;
/// Later passes overwrite earlier ones.
const FLAG_PASSES: [&[IssueCategory]; 2] = [
    &[IssueCategory::Grammar, IssueCategory::Typographical],
    &[IssueCategory::Spelling],
];

/// Whitespace-delimited words with their character spans.
fn word_spans(text: &str) -> Vec<(usize, usize, &str)> {
    let mut spans = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut char_idx = 0;
    for (byte_idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some((char_start, byte_start)) = start.take() {
                spans.push((char_start, char_idx, &text[byte_start..byte_idx]));
            }
        } else if start.is_none() {
            start = Some((char_idx, byte_idx));
        }
        char_idx += 1;
    }
    if let Some((char_start, byte_start)) = start {
        spans.push((char_start, char_idx, &text[byte_start..]));
    }
    spans
}

fn overlaps(word: (usize, usize), issue: &TextIssue) -> bool {
    let issue_end = issue.offset + issue.length.max(1);
    word.0 < issue_end && issue.offset < word.1
}

/// Marks every word of a written response, flagging those covered by a
/// checker issue. Spelling flags take precedence over grammar flags; style
/// issues are ignored.
pub fn flag_issues(text: &str, issues: &[TextIssue]) -> Vec<WordHighlight> {
    let spans = word_spans(text);
    let mut highlights: Vec<WordHighlight> = spans
        .iter()
        .enumerate()
        .map(|(idx, (_, _, word))| WordHighlight::new(*word, HighlightStatus::Correct).at_response(idx))
        .collect();

    for categories in FLAG_PASSES {
        for issue in issues.iter().filter(|issue| categories.contains(&issue.category)) {
            for (idx, (start, end, word)) in spans.iter().enumerate() {
                if !overlaps((*start, *end), issue) {
                    continue;
                }
                let flagged = if issue.category == IssueCategory::Spelling {
                    WordHighlight::new(*word, HighlightStatus::Spelling).with_suggestions(
                        issue.replacements.iter().take(MAX_SUGGESTIONS).cloned().collect(),
                    )
                } else {
                    let base = WordHighlight::new(*word, HighlightStatus::Grammar);
                    match issue.replacements.first() {
                        Some(replacement) => base.with_replacement(replacement.clone()),
                        None => base,
                    }
                };
                highlights[idx] = flagged.at_response(idx);
            }
        }
    }
    highlights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(category: IssueCategory, offset: usize, length: usize, replacements: &[&str]) -> TextIssue {
        TextIssue {
            category,
            offset,
            length,
            message: String::new(),
            replacements: replacements.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn spans_count_characters() {
        let spans = word_spans("  café au  lait ");
        assert_eq!(spans, [(2, 6, "café"), (7, 9, "au"), (11, 15, "lait")]);
    }

    #[test]
    fn grammar_and_spelling_flags() {
        let text = "She go to the libary yesterday";
        let issues = [
            issue(IssueCategory::Grammar, 4, 2, &["goes", "went"]),
            issue(IssueCategory::Spelling, 14, 6, &["library", "liberty", "libra", "lobby"]),
            issue(IssueCategory::Style, 21, 9, &[]),
        ];
        let highlights = flag_issues(text, &issues);
        assert_eq!(highlights.len(), 6);
        assert_eq!(highlights[1].status, HighlightStatus::Grammar);
        assert_eq!(highlights[1].replacement.as_deref(), Some("goes"));
        assert_eq!(highlights[4].status, HighlightStatus::Spelling);
        assert_eq!(highlights[4].suggestions, ["library", "liberty", "libra"]);
        assert_eq!(highlights[5].status, HighlightStatus::Correct);
    }

    #[test]
    fn spelling_overrides_grammar_on_the_same_word() {
        let text = "Their is a probblem";
        let issues = [
            issue(IssueCategory::Spelling, 11, 8, &["problem"]),
            issue(IssueCategory::Grammar, 9, 10, &["a problem"]),
        ];
        let highlights = flag_issues(text, &issues);
        assert_eq!(highlights[2].status, HighlightStatus::Grammar);
        assert_eq!(highlights[3].status, HighlightStatus::Spelling);
    }

    #[test]
    fn typographical_issues_flag_as_grammar() {
        let text = "It ends here ,see";
        let issues = [
            issue(IssueCategory::Typographical, 13, 4, &[", see"]),
            issue(IssueCategory::Spelling, 13, 4, &["sea"]),
        ];
        let highlights = flag_issues(text, &issues);
        assert_eq!(highlights.len(), 4);
        assert_eq!(highlights[3].status, HighlightStatus::Spelling);

        let highlights = flag_issues(text, &issues[..1]);
        assert_eq!(highlights[3].status, HighlightStatus::Grammar);
        assert_eq!(highlights[3].replacement.as_deref(), Some(", see"));
        assert!(highlights[..3].iter().all(|h| h.status == HighlightStatus::Correct));
    }
}
