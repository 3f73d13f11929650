//! The batched beam search driver.

use log::{debug, trace};
use crate::backend::{AuxState, Backend};
use crate::error::BeamError;
use crate::tensor::operations::{batch_size, read_log_probs};
use super::combine::ScoreCombiner;
use super::config::BeamSearchConfig;
use super::core_trait::StepOracle;
use super::gather::GatherEngine;
use super::select::TopKSelector;
use super::state::{BatchShape, BeamState, Hypothesis, SearchOutput};
use super::termination::TerminationController;

/// Runs beam search over a batch of contexts.
///
/// [`search`](BeamSearch::search) drives a [`StepOracle`] to completion. The
/// synchronous building blocks ([`advance`](BeamSearch::advance),
/// [`force_finish`](BeamSearch::force_finish) and
/// [`finalize`](BeamSearch::finalize)) are public as well, for callers that
/// already hold host-side log-probabilities and want to own the loop.
#[derive(Debug, Clone)]
pub struct BeamSearch {
    config: BeamSearchConfig,
}

impl BeamSearch {
    pub fn new(config: BeamSearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BeamSearchConfig {
        &self.config
    }

    /// Fresh state for `batch` rows at the configured beam width.
    pub fn init_state(&self, batch: usize) -> BeamState {
        BeamState::new(
            BatchShape::new(batch, self.config.beam_width),
            self.config.start_token,
        )
    }

    fn termination(&self) -> TerminationController {
        TerminationController::new(self.config.end_token, self.config.max_len)
    }

    /// Pins the vocabulary size on first use and rejects any later change.
    fn check_vocab(&self, state: &mut BeamState, vocab: usize) -> Result<(), BeamError> {
        match state.vocab {
            None => {
                self.config.validate_vocab(vocab)?;
                state.vocab = Some(vocab);
                Ok(())
            }
            Some(expected) if expected != vocab => Err(BeamError::VocabMismatch { expected, found: vocab }),
            Some(_) => Ok(()),
        }
    }

    fn check_log_probs(&self, state: &mut BeamState, step_log_probs: &[f32], vocab: usize) -> Result<(), BeamError> {
        let rows = state.shape().beams();
        if vocab == 0 || step_log_probs.len() != rows * vocab {
            return Err(BeamError::LogProbShape {
                rows,
                found: vec![step_log_probs.len() / vocab.max(1), vocab],
            });
        }
        self.check_vocab(state, vocab)
    }

    /// Runs one selection round on flattened `[B * K, V]` log-probabilities.
    ///
    /// Combines the step with the running scores, keeps the top `K`
    /// candidates of every row, rebuilds the beam bookkeeping and freezes the
    /// length of beams that just emitted END.
    ///
    /// # Returns
    ///
    /// The flat origin slot of every new slot, for reordering auxiliary state.
    pub fn advance(
        &self,
        state: &mut BeamState,
        step_log_probs: Vec<f32>,
        vocab: usize,
    ) -> Result<Vec<usize>, BeamError> {
        self.check_log_probs(state, &step_log_probs, vocab)?;
        let shape = state.shape();

        let combiner = ScoreCombiner::new(self.config.end_token, &*self.config.length_penalty);
        let candidates = combiner.combine(state, step_log_probs, vocab);
        let selections = TopKSelector::new(shape.beam_width, self.config.tie_break)
            .select(&candidates, shape.batch, vocab);
        let origins = GatherEngine::gather(state, &selections);
        let finished = self.termination().update_lengths(state);
        state.step += 1;

        trace!(
            "round {}: {} beams finished, {}/{} done",
            state.step,
            finished,
            state.finished_count(),
            shape.beams(),
        );
        Ok(origins)
    }

    /// Closes every open beam with END, reading only the END column.
    pub fn force_finish(
        &self,
        state: &mut BeamState,
        step_log_probs: &[f32],
        vocab: usize,
    ) -> Result<(), BeamError> {
        self.check_log_probs(state, step_log_probs, vocab)?;
        self.termination().force_finish(state, step_log_probs, vocab);
        Ok(())
    }

    /// Builds the per-row hypotheses from a finished state.
    pub fn finalize(&self, state: &BeamState) -> Vec<Vec<Hypothesis>> {
        self.termination()
            .finalize(state, &*self.config.length_penalty, self.config.sort_by_score)
    }

    /// Decodes every row of `context` and returns `K` hypotheses per row.
    ///
    /// # Parameters
    ///
    /// * `oracle` - The model scoring next tokens
    /// * `context` - Tensor of shape `[B, ...]`, handed to [`StepOracle::init`]
    ///
    /// # Errors
    ///
    /// Invalid configuration, an empty batch, malformed oracle output,
    /// misaligned auxiliary state and oracle failures all abort the search.
    pub async fn search<B, O>(&self, oracle: &O, context: &B) -> Result<SearchOutput, BeamError>
    where
        B: Backend,
        O: StepOracle<B> + ?Sized,
    {
        self.config.validate()?;
        let batch = batch_size(context)?;
        let mut state = self.init_state(batch);
        let beams = state.shape().beams();
        let termination = self.termination();

        debug!(
            "beam search over {} rows, beam width {}, max length {}",
            batch, self.config.beam_width, self.config.max_len
        );

        let mut aux = oracle.init(context, self.config.beam_width).await?;
        check_aux(&aux, beams)?;

        let mut exhausted = false;
        while termination.has_budget(&state) {
            let (log_probs, next) = oracle.step(state.paths(), aux).await?;
            check_aux(&next, beams)?;
            let (values, vocab) = read_log_probs(&log_probs, beams)?;
            let origins = self.advance(&mut state, values, vocab)?;
            aux = oracle.update(&origins, next).await?;
            check_aux(&aux, beams)?;

            if state.all_finished() {
                exhausted = true;
                break;
            }
        }

        let steps = state.step();
        let forced = !exhausted;
        if forced {
            let open = beams - state.finished_count();
            let (log_probs, last) = oracle.step(state.paths(), aux).await?;
            check_aux(&last, beams)?;
            let (values, vocab) = read_log_probs(&log_probs, beams)?;
            self.force_finish(&mut state, &values, vocab)?;
            debug!("closed {} open beams at max length after {} rounds", open, steps);
        } else {
            debug!("all beams finished after {} rounds", steps);
        }

        Ok(SearchOutput {
            hypotheses: self.finalize(&state),
            steps,
            forced,
        })
    }
}

fn check_aux<S: AuxState>(aux: &S, beams: usize) -> Result<(), BeamError> {
    match aux.batch_len() {
        Some(found) if found != beams => Err(BeamError::StateBatchMismatch { expected: beams, found }),
        _ => Ok(()),
    }
}
