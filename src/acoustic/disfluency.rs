use serde::Serialize;

use crate::text::lexicon::FILLERS;
use crate::text::{normalize, words};

/// Transcript-level hesitation markers. Diagnostic only; they do not feed
/// any score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisfluencyCounts {
    pub fillers: usize,
    pub repetitions: usize,
    pub false_starts: usize,
}

impl DisfluencyCounts {
    pub fn total(&self) -> usize {
        self.fillers + self.repetitions + self.false_starts
    }
}

pub fn count_disfluencies(transcript: &str) -> DisfluencyCounts {
    let tokens = words(transcript);
    let repetitions = tokens.windows(2).filter(|pair| pair[0] == pair[1]).count();
    // "I went I went" style restarts: a word echoing the one two back
    let false_starts = tokens.windows(3).filter(|w| w[0] == w[2]).count();
    DisfluencyCounts {
        fillers: FILLERS.count_occurrences(&normalize(transcript, true)),
        repetitions,
        false_starts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_kind() {
        let counts = count_disfluencies("Um, the the river, uh, it it flows. I went I went home.");
        assert_eq!(counts.fillers, 2);
        assert_eq!(counts.repetitions, 2);
        // "I went I" and "went I went"
        assert_eq!(counts.false_starts, 2);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn clean_speech_has_none() {
        assert_eq!(
            count_disfluencies("Rivers carved the valley over many centuries."),
            DisfluencyCounts::default()
        );
    }
}
