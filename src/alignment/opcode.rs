use crate::alignment::sequence_matcher::{OpTag, SequenceMatcher};
use crate::types::{HighlightStatus, Token, WordHighlight};

/// Edit-script alignment over normalized words.
///
/// Replace blocks pair reference and response tokens position-wise as
/// substitutions; whatever one side has left over in the block is missing
/// (reference) or extra (response).
pub fn align_opcode(reference: &[Token], response: &[Token]) -> Vec<WordHighlight> {
    let reference_words: Vec<&str> = reference.iter().map(|t| t.normalized.as_str()).collect();
    let response_words: Vec<&str> = response.iter().map(|t| t.normalized.as_str()).collect();
    let matcher = SequenceMatcher::new(&reference_words, &response_words);

    let mut highlights = Vec::with_capacity(reference.len() + response.len());
    for op in matcher.opcodes() {
        match op.tag {
            OpTag::Equal => {
                for (ref_idx, resp_idx) in (op.a_start..op.a_end).zip(op.b_start..op.b_end) {
                    highlights.push(
                        WordHighlight::new(&reference[ref_idx].text, HighlightStatus::Correct)
                            .at_reference(ref_idx)
                            .at_response(resp_idx),
                    );
                }
            }
            OpTag::Delete => push_missing(&mut highlights, reference, op.a_start..op.a_end),
            OpTag::Insert => push_extra(&mut highlights, response, op.b_start..op.b_end),
            OpTag::Replace => {
                let paired = (op.a_end - op.a_start).min(op.b_end - op.b_start);
                for offset in 0..paired {
                    let ref_idx = op.a_start + offset;
                    let resp_idx = op.b_start + offset;
                    highlights.push(
                        WordHighlight::new(&reference[ref_idx].text, HighlightStatus::Substituted)
                            .with_replacement(&response[resp_idx].text)
                            .at_reference(ref_idx)
                            .at_response(resp_idx),
                    );
                }
                push_missing(&mut highlights, reference, op.a_start + paired..op.a_end);
                push_extra(&mut highlights, response, op.b_start + paired..op.b_end);
            }
        }
    }
    highlights
}

fn push_missing(
    highlights: &mut Vec<WordHighlight>,
    reference: &[Token],
    range: std::ops::Range<usize>,
) {
    for ref_idx in range {
        highlights.push(
            WordHighlight::new(&reference[ref_idx].text, HighlightStatus::Missing)
                .at_reference(ref_idx),
        );
    }
}

fn push_extra(highlights: &mut Vec<WordHighlight>, response: &[Token], range: std::ops::Range<usize>) {
    for resp_idx in range {
        highlights.push(
            WordHighlight::new(&response[resp_idx].text, HighlightStatus::Extra)
                .at_response(resp_idx),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    #[test]
    fn cat_on_the_mat() {
        let reference = tokenize("the cat sat on the mat");
        let response = tokenize("a cat sat on the mat");
        let highlights = align_opcode(&reference, &response);
        assert_eq!(highlights.len(), 6);
        assert_eq!(highlights[0].status, HighlightStatus::Substituted);
        assert_eq!(highlights[0].word, "the");
        assert_eq!(highlights[0].replacement.as_deref(), Some("a"));
        assert!(highlights[1..]
            .iter()
            .all(|h| h.status == HighlightStatus::Correct));
    }

    #[test]
    fn uneven_replace_block_spills_into_missing_and_extra() {
        let reference = tokenize("we went to the big old house");
        let response = tokenize("we drove to the house");
        let highlights = align_opcode(&reference, &response);
        let statuses: Vec<HighlightStatus> = highlights.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            [
                HighlightStatus::Correct,
                HighlightStatus::Substituted,
                HighlightStatus::Correct,
                HighlightStatus::Correct,
                HighlightStatus::Missing,
                HighlightStatus::Missing,
                HighlightStatus::Correct,
            ]
        );

        let response = tokenize("we really truly went home");
        let reference = tokenize("we went");
        let highlights = align_opcode(&reference, &response);
        let extra = highlights
            .iter()
            .filter(|h| h.status == HighlightStatus::Extra)
            .count();
        assert_eq!(extra, 3);
    }
}
