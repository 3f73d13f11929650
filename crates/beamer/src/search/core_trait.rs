use async_trait::async_trait;
use crate::backend::{AuxState, Backend};
use crate::error::BeamError;

/// A model that scores the next token for every beam.
///
/// The search drives the oracle one step at a time. It never looks inside the
/// oracle's auxiliary state: the state is created by [`init`](StepOracle::init),
/// threaded through every [`step`](StepOracle::step), and reordered with
/// [`update`](StepOracle::update) whenever beams are pruned or duplicated.
///
/// # Type Parameters
///
/// * `B` - The tensor type of both the context and the returned log-probabilities
///
/// # Implementation Notes
///
/// * Beam slots are flattened row-major over `(batch row, beam)`; slot
///   `row * K + beam` belongs to batch row `row`
/// * `step` must return log-probabilities of shape `[B * K, V]` with the same
///   `V` on every call
/// * Row-addressable state should report `Some(B * K)` from
///   [`AuxState::batch_len`] so the search can check it after `init` and `update`
///
/// # Example
///
/// ```ignore
/// use beamer::search::StepOracle;
/// use beamer::{repeat_batch, BeamError};
/// use async_trait::async_trait;
///
/// struct Decoder {
///     model: MyModel,
/// }
///
/// #[async_trait]
/// impl StepOracle<Tensor> for Decoder {
///     type State = Tensor;
///
///     async fn init(&self, context: &Tensor, beam_width: usize) -> Result<Tensor, BeamError> {
///         repeat_batch(context, beam_width)
///     }
///
///     async fn step(&self, paths: &[Vec<u32>], state: Tensor) -> Result<(Tensor, Tensor), BeamError> {
///         let log_probs = self.model.decode(paths, &state).map_err(BeamError::backend)?;
///         Ok((log_probs, state))
///     }
/// }
/// ```
#[async_trait]
pub trait StepOracle<B>: Send + Sync
where B: Backend
{
    /// Per-beam state carried between steps, such as encoder outputs or caches.
    type State: AuxState + Send;

    /// Builds the state for `B * beam_width` beam slots from a `[B, ...]` context.
    async fn init(&self, context: &B, beam_width: usize) -> Result<Self::State, BeamError>;

    /// Scores the next token for every beam.
    ///
    /// # Parameters
    ///
    /// * `paths` - One path per beam slot, START token first
    /// * `state` - The state returned by the previous call
    ///
    /// # Returns
    ///
    /// Log-probabilities of shape `[B * K, V]` and the state for the next step
    async fn step(&self, paths: &[Vec<u32>], state: Self::State) -> Result<(B, Self::State), BeamError>;

    /// Reorders the state after selection so that slot `i` holds the old slot `origins[i]`.
    async fn update(&self, origins: &[usize], state: Self::State) -> Result<Self::State, BeamError> {
        state.reorder(origins)
    }
}
