//! Reindexing per-beam state after a selection round.

use super::select::Selection;
use super::state::BeamState;

/// Moves beam bookkeeping from origin slots into new slots.
pub struct GatherEngine;

impl GatherEngine {
    /// Converts row-local origins into flat `B * K` slot indices.
    pub fn flat_origins(state: &BeamState, selections: &[Selection]) -> Vec<usize> {
        let k = state.shape().beam_width;
        selections
            .iter()
            .enumerate()
            .map(|(slot, sel)| (slot / k) * k + sel.origin_beam)
            .collect()
    }

    /// Rebuilds paths, lengths and log-probabilities for the new slots.
    ///
    /// New arrays are built from the previous ones and swapped in, so a slot
    /// that is its own origin, or an origin shared by several slots, reads
    /// the pre-round values. Returns the flat origins for reordering
    /// auxiliary state.
    pub fn gather(state: &mut BeamState, selections: &[Selection]) -> Vec<usize> {
        let origins = Self::flat_origins(state, selections);

        let paths = origins
            .iter()
            .zip(selections)
            .map(|(&origin, sel)| {
                let mut path = Vec::with_capacity(state.paths[origin].len() + 1);
                path.extend_from_slice(&state.paths[origin]);
                path.push(sel.token);
                path
            })
            .collect();
        let lengths = origins.iter().map(|&origin| state.lengths[origin]).collect();
        let log_probs = selections.iter().map(|sel| sel.log_prob).collect();

        state.paths = paths;
        state.lengths = lengths;
        state.log_probs = log_probs;
        origins
    }
}
