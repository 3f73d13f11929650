use async_trait::async_trait;

/// One pass over a batch of queued requests.
///
/// The batching loop owns the queue; a handler only knows how to turn a group
/// of requests into one model input, run it, and answer the requesters.
#[async_trait]
pub trait BatchHandler: Send + Sync {
    type Request: Send;
    type ModelInput: Send + Sync;
    type ModelOutput: Send;
    type Error: Send;

    /// Whether `other` may share a batch with `first`.
    ///
    /// Requests that cannot join stay queued, in order, for a later batch.
    fn can_batch(&self, _first: &Self::Request, _other: &Self::Request) -> bool {
        true
    }

    /// Build one model input from the drained requests.
    async fn make_batch_input(&self, requests: &[Self::Request]) -> Result<Self::ModelInput, Self::Error>;

    /// Run the model over a whole batch.
    async fn forward(&self, model_input: &Self::ModelInput) -> Result<Self::ModelOutput, Self::Error>;

    /// Send every requester its share of the output, or the failure.
    async fn handle_outputs(&self, requests: Vec<Self::Request>, output: Result<Self::ModelOutput, Self::Error>);
}
