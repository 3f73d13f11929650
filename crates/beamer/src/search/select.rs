//! Top-k selection over the flattened candidate pool.

use std::cmp::Ordering;
use super::combine::Candidates;
use super::config::TieBreak;

/// A surviving candidate for one new beam slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Beam the candidate extends, local to its batch row (`[0, K)`)
    pub origin_beam: usize,

    /// Token appended to the origin path
    pub token: u32,

    /// Penalized score the candidate was ranked by
    pub score: f32,

    /// Unpenalized cumulative log-probability read from the same candidate
    pub log_prob: f32,
}

/// Picks the `K` best candidates of every batch row.
#[derive(Debug, Clone, Copy)]
pub struct TopKSelector {
    k: usize,
    tie_break: TieBreak,
}

impl TopKSelector {
    pub fn new(k: usize, tie_break: TieBreak) -> Self {
        Self { k, tie_break }
    }

    /// Ranks one row's scores and returns the flat indices of its top `k`, best first.
    ///
    /// `NaN` ranks as negative infinity. The ordering is total, so the result
    /// does not depend on the sort algorithm.
    pub fn top_k(&self, scores: &[f32]) -> Vec<usize> {
        let key = |i: usize| {
            let s = scores[i];
            if s.is_nan() { f32::NEG_INFINITY } else { s }
        };
        let tie_break = self.tie_break;
        let cmp = |a: &usize, b: &usize| -> Ordering {
            key(*b).total_cmp(&key(*a)).then_with(|| match tie_break {
                TieBreak::LowestIndex => a.cmp(b),
                TieBreak::HighestIndex => b.cmp(a),
            })
        };

        let mut indices: Vec<usize> = (0..scores.len()).collect();
        let k = self.k.min(indices.len());
        if k == 0 {
            return vec![];
        }
        if k < indices.len() {
            indices.select_nth_unstable_by(k - 1, cmp);
            indices.truncate(k);
        }
        indices.sort_unstable_by(cmp);
        indices
    }

    /// Selects `K` candidates per batch row, row by row.
    ///
    /// A flat index `i` within a row decomposes into
    /// `(origin_beam, token) = (i / V, i % V)`.
    pub fn select(&self, candidates: &Candidates, batch: usize, vocab: usize) -> Vec<Selection> {
        let mut selections = Vec::with_capacity(batch * self.k);
        for row in 0..batch {
            let scores = candidates.row_scores(row);
            let log_probs = candidates.row_log_probs(row);
            for idx in self.top_k(scores) {
                selections.push(Selection {
                    origin_beam: idx / vocab,
                    token: (idx % vocab) as u32,
                    score: scores[idx],
                    log_prob: log_probs[idx],
                });
            }
        }
        selections
    }
}
