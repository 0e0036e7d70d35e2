use crate::alignment::sequence_matcher::char_ratio;
use crate::types::{HighlightStatus, Token, WordHighlight};

/// Minimum character similarity for a non-identical word to count as a
/// misspelling of a reference word.
pub const MISSPELLING_RATIO: f64 = 0.75;

/// Left-to-right greedy alignment.
///
/// Each response token claims the first unused reference token with the same
/// normalized form; failing that, the unused reference token with the highest
/// character similarity (at least [`MISSPELLING_RATIO`]). Unclaimed reference
/// tokens are appended as missing.
pub fn align_greedy(reference: &[Token], response: &[Token]) -> Vec<WordHighlight> {
    let mut used = vec![false; reference.len()];
    let mut highlights = Vec::with_capacity(reference.len() + response.len());

    for (response_idx, token) in response.iter().enumerate() {
        let exact = reference
            .iter()
            .enumerate()
            .find(|(idx, candidate)| !used[*idx] && candidate.normalized == token.normalized)
            .map(|(idx, _)| idx);

        if let Some(ref_idx) = exact {
            used[ref_idx] = true;
            highlights.push(
                WordHighlight::new(&token.text, HighlightStatus::Correct)
                    .at_reference(ref_idx)
                    .at_response(response_idx),
            );
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        for (ref_idx, candidate) in reference.iter().enumerate() {
            if used[ref_idx] {
                continue;
            }
            let similarity = char_ratio(&candidate.normalized, &token.normalized);
            let improves = best.map_or(true, |(_, best_similarity)| similarity > best_similarity);
            if similarity >= MISSPELLING_RATIO && improves {
                best = Some((ref_idx, similarity));
            }
        }

        match best {
            Some((ref_idx, _)) => {
                used[ref_idx] = true;
                highlights.push(
                    WordHighlight::new(&token.text, HighlightStatus::Misspelled)
                        .with_replacement(&reference[ref_idx].text)
                        .at_reference(ref_idx)
                        .at_response(response_idx),
                );
            }
            None => highlights.push(
                WordHighlight::new(&token.text, HighlightStatus::Extra).at_response(response_idx),
            ),
        }
    }

    for (ref_idx, token) in reference.iter().enumerate() {
        if !used[ref_idx] {
            highlights.push(
                WordHighlight::new(&token.text, HighlightStatus::Missing).at_reference(ref_idx),
            );
        }
    }
    highlights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn statuses(highlights: &[WordHighlight]) -> Vec<(&str, HighlightStatus)> {
        highlights
            .iter()
            .map(|h| (h.word.as_str(), h.status))
            .collect()
    }

    #[test]
    fn exact_then_fuzzy_then_missing() {
        let reference = tokenize("The scientists recieved funding.");
        let response = tokenize("the scientist received money");
        let highlights = align_greedy(&reference, &response);
        assert_eq!(
            statuses(&highlights),
            [
                ("the", HighlightStatus::Correct),
                ("scientist", HighlightStatus::Misspelled),
                ("received", HighlightStatus::Misspelled),
                ("money", HighlightStatus::Extra),
                ("funding.", HighlightStatus::Missing),
            ]
        );
        assert_eq!(highlights[1].replacement.as_deref(), Some("scientists"));
        assert_eq!(highlights[4].reference_index, Some(3));
    }

    #[test]
    fn duplicate_words_consume_distinct_reference_slots() {
        let reference = tokenize("go go home");
        let response = tokenize("go go go");
        let highlights = align_greedy(&reference, &response);
        let correct = highlights
            .iter()
            .filter(|h| h.status == HighlightStatus::Correct)
            .count();
        assert_eq!(correct, 2);
        assert_eq!(highlights[2].status, HighlightStatus::Extra);
        assert_eq!(highlights[3].status, HighlightStatus::Missing);
        assert_eq!(highlights[3].word, "home");
    }

    #[test]
    fn empty_sides() {
        let reference = tokenize("two words");
        assert!(align_greedy(&[], &[]).is_empty());
        let missing = align_greedy(&reference, &[]);
        assert!(missing.iter().all(|h| h.status == HighlightStatus::Missing));
        let extra = align_greedy(&[], &reference);
        assert!(extra.iter().all(|h| h.status == HighlightStatus::Extra));
    }
}
