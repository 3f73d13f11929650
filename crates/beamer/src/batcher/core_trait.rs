use async_trait::async_trait;
use crate::search::Hypothesis;
use super::item::Item;

/// Submits single-row contexts to a shared beam search.
///
/// # Type Parameters
///
/// * `B` - The context tensor type; every submitted context has shape `[1, ...]`
#[async_trait]
pub trait BeamSearchBatcher<B> {
    /// Queues `context` and returns the pending hypotheses for it.
    ///
    /// The returned [`Item`] resolves to the `K` hypotheses of the request's
    /// row once the batch it joined has been searched.
    async fn run(&self, context: B) -> Item<Vec<Hypothesis>>;
}
