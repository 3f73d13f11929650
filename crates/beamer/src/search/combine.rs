//! Turning next-token log-probabilities into ranked candidate scores.

use super::penalty::LengthPenalty;
use super::state::BeamState;

/// Log-probability given to every non-END token of a finished beam.
///
/// Large and negative but finite, so masked candidates still order
/// deterministically among themselves.
pub const MASKED_LOG_PROB: f32 = -1e8;

/// Candidate extensions for every batch row.
///
/// Row `r` owns entries `[r * per_row, (r + 1) * per_row)`. Inside a row the
/// entry for `(local beam b, token v)` sits at `b * V + v`; at step 0 only
/// beam 0 is present, so `per_row == V`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub(crate) per_row: usize,

    /// Unpenalized `prior + step` log-probabilities
    pub(crate) log_probs: Vec<f32>,

    /// Penalized scores used for ranking
    pub(crate) scores: Vec<f32>,
}

impl Candidates {
    pub fn per_row(&self) -> usize {
        self.per_row
    }

    pub fn row_scores(&self, row: usize) -> &[f32] {
        &self.scores[row * self.per_row..(row + 1) * self.per_row]
    }

    pub fn row_log_probs(&self, row: usize) -> &[f32] {
        &self.log_probs[row * self.per_row..(row + 1) * self.per_row]
    }
}

/// Combines oracle output with the running beam scores.
pub struct ScoreCombiner<'a> {
    end_token: u32,
    penalty: &'a dyn LengthPenalty,
}

impl<'a> ScoreCombiner<'a> {
    pub fn new(end_token: u32, penalty: &'a dyn LengthPenalty) -> Self {
        Self { end_token, penalty }
    }

    /// Forces all of a finished beam's probability mass onto END.
    ///
    /// `step_log_probs` is the flattened `(B * K, V)` oracle output.
    pub fn mask_finished(&self, state: &BeamState, step_log_probs: &mut [f32], vocab: usize) {
        let end = self.end_token as usize;
        for (slot, row) in step_log_probs.chunks_mut(vocab).enumerate() {
            if state.is_finished(slot) {
                row.fill(MASKED_LOG_PROB);
                row[end] = 0.0;
            }
        }
    }

    /// Builds the candidate pool for the next selection round.
    ///
    /// Every candidate carries `prior + step` as its log-probability and
    /// `log_prob / penalty(length)` as its score, where `length` is the frozen
    /// length of a finished beam and `t + 1` for an open one. At step 0 the
    /// beams of a row are indistinguishable, so only beam 0 is offered.
    pub fn combine(&self, state: &BeamState, mut step_log_probs: Vec<f32>, vocab: usize) -> Candidates {
        let shape = state.shape();
        let tentative = state.step() + 1;

        if state.step() == 0 {
            let penalty = self.penalty.penalty(tentative);
            let mut log_probs = Vec::with_capacity(shape.batch * vocab);
            for row in 0..shape.batch {
                let slot = shape.flat(row, 0);
                let prior = state.log_probs[slot];
                log_probs.extend(step_log_probs[slot * vocab..(slot + 1) * vocab].iter().map(|lp| prior + lp));
            }
            let scores = log_probs.iter().map(|lp| lp / penalty).collect();
            return Candidates { per_row: vocab, log_probs, scores };
        }

        self.mask_finished(state, &mut step_log_probs, vocab);

        let mut log_probs = Vec::with_capacity(step_log_probs.len());
        let mut scores = Vec::with_capacity(step_log_probs.len());
        for (slot, row) in step_log_probs.chunks(vocab).enumerate() {
            let prior = state.log_probs[slot];
            let length = match state.lengths[slot] {
                0 => tentative,
                frozen => frozen,
            };
            let penalty = self.penalty.penalty(length);
            for lp in row {
                let combined = prior + lp;
                log_probs.push(combined);
                scores.push(combined / penalty);
            }
        }
        Candidates {
            per_row: shape.beam_width * vocab,
            log_probs,
            scores,
        }
    }
}
