//! Finishing beams, stopping the loop and building the final output.

use super::penalty::LengthPenalty;
use super::state::{BeamState, Hypothesis};

/// Tracks which beams have emitted END and closes the search.
#[derive(Debug, Clone, Copy)]
pub struct TerminationController {
    end_token: u32,
    max_len: usize,
}

impl TerminationController {
    pub fn new(end_token: u32, max_len: usize) -> Self {
        Self { end_token, max_len }
    }

    /// Freezes the length of every open beam whose newest token is END.
    ///
    /// Called after the gather of round `t` (before the step counter moves),
    /// so a beam finishing now gets length `t + 1`. Returns how many beams
    /// finished in this round.
    pub fn update_lengths(&self, state: &mut BeamState) -> usize {
        let length = state.step + 1;
        let mut newly_finished = 0;
        for (path, len) in state.paths.iter().zip(state.lengths.iter_mut()) {
            if *len == 0 && path.last() == Some(&self.end_token) {
                *len = length;
                newly_finished += 1;
            }
        }
        newly_finished
    }

    /// The main loop may run another selection round.
    ///
    /// Rounds stop one short of `max_len` so that the forced END still fits.
    pub fn has_budget(&self, state: &BeamState) -> bool {
        state.step + 1 < self.max_len
    }

    /// Closes every open beam with END using one extra oracle step.
    ///
    /// Only the END column of `step_log_probs` is read. Finished beams already
    /// paid for their END and gain nothing; open beams add END's
    /// log-probability and are frozen at the current length. Every path gets
    /// an END appended so all paths keep the same length.
    pub fn force_finish(&self, state: &mut BeamState, step_log_probs: &[f32], vocab: usize) {
        let end = self.end_token as usize;
        let length = state.step + 1;
        for slot in 0..state.paths.len() {
            if state.lengths[slot] == 0 {
                state.log_probs[slot] += step_log_probs[slot * vocab + end];
                state.lengths[slot] = length;
            }
            state.paths[slot].push(self.end_token);
        }
        state.step += 1;
    }

    /// Reads the final hypotheses out of the state.
    ///
    /// Tokens exclude START and stop at the beam's length. Scores are
    /// `log_prob / penalty(length)`. Rows keep the last selection order unless
    /// `sort_by_score` is set, in which case a stable descending sort is used.
    pub fn finalize(
        &self,
        state: &BeamState,
        penalty: &dyn LengthPenalty,
        sort_by_score: bool,
    ) -> Vec<Vec<Hypothesis>> {
        (0..state.shape.batch)
            .map(|row| {
                let mut hypotheses: Vec<Hypothesis> = state
                    .row_slots(row)
                    .map(|slot| {
                        let generated = &state.paths[slot][1..];
                        let length = match state.lengths[slot] {
                            0 => generated.len(),
                            frozen => frozen.min(generated.len()),
                        };
                        let log_prob = state.log_probs[slot];
                        Hypothesis {
                            tokens: generated[..length].to_vec(),
                            length,
                            score: penalty.apply(log_prob, length),
                            log_prob,
                        }
                    })
                    .collect();
                if sort_by_score {
                    hypotheses.sort_by(|a, b| b.score.total_cmp(&a.score));
                }
                hypotheses
            })
            .collect()
    }
}
