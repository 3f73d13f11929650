use std::marker::PhantomData;
use async_trait::async_trait;
use log::{debug, warn};
use uuid::Uuid;
use crate::backend::Backend;
use crate::core::handler::BatchHandler;
use crate::error::BeamError;
use crate::search::{BeamSearch, SearchOutput, StepOracle};
use crate::tensor::operations::stack_contexts;
use super::queue_item::QueueItem;

/// Runs one beam search per drained batch of requests.
///
/// # Type Parameters
///
/// * `O` - The oracle shared by every search
/// * `B` - The context tensor type
pub struct BeamSearchHandler<O, B> {
    oracle: O,
    search: BeamSearch,
    _marker: PhantomData<B>,
}

impl<O, B> BeamSearchHandler<O, B> {
    pub fn new(oracle: O, search: BeamSearch) -> Self {
        Self {
            oracle,
            search,
            _marker: PhantomData,
        }
    }
}

fn ids<B>(requests: &[QueueItem<B>]) -> Vec<Uuid> {
    requests.iter().map(QueueItem::id).collect()
}

#[async_trait]
impl<O, B> BatchHandler for BeamSearchHandler<O, B>
where
    B: Backend,
    O: StepOracle<B> + 'static,
{
    type Request = QueueItem<B>;
    type ModelInput = B;
    type ModelOutput = SearchOutput;
    type Error = BeamError;

    /// Contexts are concatenated along the batch dimension, so their other
    /// dimensions have to agree.
    fn can_batch(&self, first: &Self::Request, other: &Self::Request) -> bool {
        first.context().shape() == other.context().shape()
    }

    /// Stacks the `[1, ...]` contexts into one `[n, ...]` batch, in queue order.
    async fn make_batch_input(&self, requests: &[Self::Request]) -> Result<B, BeamError> {
        let contexts: Vec<B> = requests.iter().map(|r| r.context().clone()).collect();
        stack_contexts(&contexts)
    }

    async fn forward(&self, model_input: &B) -> Result<SearchOutput, BeamError> {
        self.search.search(&self.oracle, model_input).await
    }

    /// Row `i` of the search output goes to request `i`. A failed search is
    /// reported to every request of the batch.
    async fn handle_outputs(&self, requests: Vec<Self::Request>, output: Result<SearchOutput, BeamError>) {
        match output {
            Ok(output) => {
                debug!(
                    "searched batch {:?} in {} rounds (forced: {})",
                    ids(&requests),
                    output.steps,
                    output.forced,
                );
                let rows = output.hypotheses.len();
                if rows != requests.len() {
                    warn!("search returned {} rows for {} requests", rows, requests.len());
                }
                // requests without a row are dropped, which resolves them to WorkerClosed
                for (request, hypotheses) in requests.into_iter().zip(output.hypotheses) {
                    request.reply(Ok(hypotheses));
                }
            }
            Err(err) => {
                warn!("search over batch {:?} failed: {}", ids(&requests), err);
                for request in requests {
                    request.reply(Err(err.clone()));
                }
            }
        }
    }
}
