use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// Edit-script step: `a[a_start..a_end]` becomes `b[b_start..b_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// Longest-matching-block diff over two sequences.
///
/// Finds the longest contiguous matching block, then recurses on the pieces
/// to its left and right. No element is ever treated as junk, so results
/// depend only on the two sequences.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b_index: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b_index: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b_index.entry(item).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    /// Longest block with `a[i..i+k] == b[j..j+k]` inside the given window.
    /// Ties resolve to the earliest `i`, then the earliest `j`.
    pub fn find_longest_match(
        &self,
        a_lo: usize,
        a_hi: usize,
        b_lo: usize,
        b_hi: usize,
    ) -> MatchBlock {
        let mut best = MatchBlock {
            a: a_lo,
            b: b_lo,
            size: 0,
        };
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_run_lengths = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run_lengths.insert(j, k);
                    if k > best.size {
                        best = MatchBlock {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            run_lengths = next_run_lengths;
        }
        best
    }

    /// Non-overlapping matching blocks in increasing order, adjacent blocks
    /// merged, terminated by a zero-size sentinel at `(len(a), len(b))`.
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let (len_a, len_b) = (self.a.len(), self.b.len());
        let mut pending = vec![(0, len_a, 0, len_b)];
        let mut found = Vec::new();
        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }
            if a_lo < block.a && b_lo < block.b {
                pending.push((a_lo, block.a, b_lo, block.b));
            }
            if block.a + block.size < a_hi && block.b + block.size < b_hi {
                pending.push((block.a + block.size, a_hi, block.b + block.size, b_hi));
            }
            found.push(block);
        }
        found.sort_by_key(|block| (block.a, block.b));

        let mut merged: Vec<MatchBlock> = Vec::with_capacity(found.len() + 1);
        for block in found {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(MatchBlock {
            a: len_a,
            b: len_b,
            size: 0,
        });
        merged
    }

    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut i = 0;
        let mut j = 0;
        let mut ops = Vec::new();
        for block in self.matching_blocks() {
            let tag = match (i < block.a, j < block.b) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: block.a,
                    b_start: j,
                    b_end: block.b,
                });
            }
            i = block.a + block.size;
            j = block.b + block.size;
            if block.size > 0 {
                ops.push(Opcode {
                    tag: OpTag::Equal,
                    a_start: block.a,
                    a_end: i,
                    b_start: block.b,
                    b_end: j,
                });
            }
        }
        ops
    }

    pub fn matched_len(&self) -> usize {
        self.matching_blocks().iter().map(|block| block.size).sum()
    }

    /// `2·M / T`, where `M` is the number of matched elements and `T` the
    /// combined length. Two empty sequences are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matched_len() as f64 / total as f64
    }
}

/// Character-level similarity ratio of two words.
pub fn char_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    SequenceMatcher::new(&a, &b).ratio()
}
