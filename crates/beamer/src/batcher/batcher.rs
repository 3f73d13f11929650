use std::sync::Arc;
use async_trait::async_trait;
use log::debug;
use tokio::sync::{oneshot, Mutex};
use crate::backend::Backend;
use crate::core::batch::batching_loop;
use crate::core::worker::BatchWorkerHandle;
use crate::error::BeamError;
use crate::search::{BeamSearch, BeamSearchConfig, Hypothesis, StepOracle};
use super::core_trait::BeamSearchBatcher;
use super::handler::BeamSearchHandler;
use super::item::Item;
use super::queue_item::QueueItem;

/// Collects concurrent single-row requests into batched beam searches.
///
/// Up to `S` queued contexts with matching shapes are stacked into one
/// `[n, ...]` batch and searched together on a background task. Each
/// requester receives the hypotheses of its own row. Dropping the batcher
/// stops the task.
///
/// # Type Parameters
///
/// * `B` - The context tensor type
/// * `S` - Maximum number of requests per search
pub struct BeamSearchBatchInference<B, const S: usize> {
    waiting_requests: Arc<Mutex<Vec<QueueItem<B>>>>,
    handle: BatchWorkerHandle,
}

impl<B, const S: usize> BeamSearchBatchInference<B, S>
where B: Backend
{
    /// Spawns the batching task. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` is invalid.
    pub fn new<O>(oracle: O, config: BeamSearchConfig) -> Result<Self, BeamError>
    where O: StepOracle<B> + 'static,
    {
        config.validate()?;
        let waiting_requests = Arc::new(Mutex::new(vec![]));

        let handle = BatchWorkerHandle::new({
            let waiting_requests = waiting_requests.clone();
            move |running, notifier| {
                tokio::spawn(async move {
                    let handler = BeamSearchHandler::new(oracle, BeamSearch::new(config));
                    batching_loop::<BeamSearchHandler<O, B>, S>(
                        &handler,
                        running,
                        notifier,
                        waiting_requests,
                    ).await;
                })
            }
        });

        Ok(Self {
            waiting_requests,
            handle,
        })
    }

    /// Number of requests waiting for a batch.
    pub async fn queued(&self) -> usize {
        self.waiting_requests.lock().await.len()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }
}

#[async_trait]
impl<B, const S: usize> BeamSearchBatcher<B> for BeamSearchBatchInference<B, S>
where B: Backend
{
    async fn run(&self, context: B) -> Item<Vec<Hypothesis>> {
        let (tx, rx) = oneshot::channel();
        let shape = context.shape();
        if shape.first() != Some(&1) {
            let _ = tx.send(Err(BeamError::RequestShape { found: shape }));
            return Item::new(rx);
        }

        let request = QueueItem::new(context, tx);
        debug!("queued search request {}", request.id());
        self.waiting_requests.lock().await.push(request);
        self.handle.notify();
        Item::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use futures::future::join_all;
    use crate::backend::mock_tensor::MockTensor;
    use crate::tensor::operations::repeat_batch;

    const END: u32 = 2;
    const VOCAB: usize = 8;

    /// Emits the token stored in the context row, then END.
    struct EchoTokenOracle {
        batches: StdMutex<Vec<usize>>,
        fail: bool,
    }

    impl EchoTokenOracle {
        fn new() -> Self {
            Self { batches: StdMutex::new(vec![]), fail: false }
        }

        fn failing() -> Self {
            Self { batches: StdMutex::new(vec![]), fail: true }
        }
    }

    #[async_trait]
    impl StepOracle<MockTensor> for EchoTokenOracle {
        type State = Vec<u32>;

        async fn init(&self, context: &MockTensor, beam_width: usize) -> Result<Vec<u32>, BeamError> {
            self.batches.lock().unwrap().push(context.shape()[0]);
            let tiled = repeat_batch(context, beam_width)?;
            Ok(tiled.to_f32_vec()?.into_iter().map(|v| v as u32).collect())
        }

        async fn step(&self, paths: &[Vec<u32>], state: Vec<u32>) -> Result<(MockTensor, Vec<u32>), BeamError> {
            if self.fail {
                return Err(BeamError::backend("device lost"));
            }
            let rows: Vec<Vec<f32>> = paths
                .iter()
                .zip(&state)
                .map(|(path, &token)| {
                    let mut row = vec![-10.0; VOCAB];
                    if path.len() == 1 {
                        row[token as usize] = 0.0;
                    } else {
                        row[END as usize] = 0.0;
                    }
                    row
                })
                .collect();
            Ok((MockTensor::from_rows(&rows), state))
        }
    }

    fn request(token: u32) -> MockTensor {
        MockTensor::new(vec![1, 1], vec![token as f32])
    }

    #[tokio::test]
    async fn test_each_request_gets_its_row() {
        let _ = env_logger::builder().is_test(true).try_init();
        let batcher = BeamSearchBatchInference::<MockTensor, 4>::new(
            EchoTokenOracle::new(),
            BeamSearchConfig::greedy().with_max_len(5),
        )
        .unwrap();

        let items = vec![
            batcher.run(request(3)).await,
            batcher.run(request(5)).await,
            batcher.run(request(7)).await,
        ];
        let results = join_all(items).await;

        for (result, token) in results.into_iter().zip([3, 5, 7]) {
            let hypotheses = result.unwrap();
            assert_eq!(hypotheses.len(), 1);
            assert_eq!(hypotheses[0].tokens, vec![token, END]);
        }
    }

    #[tokio::test]
    async fn test_batches_never_exceed_capacity() {
        let oracle = Arc::new(EchoTokenOracle::new());
        let batcher = BeamSearchBatchInference::<MockTensor, 2>::new(
            SharedOracle(oracle.clone()),
            BeamSearchConfig::greedy().with_max_len(4),
        )
        .unwrap();

        let mut items = vec![];
        for token in [3, 4, 5, 6, 7] {
            items.push(batcher.run(request(token)).await);
        }
        for result in join_all(items).await {
            assert!(result.is_ok());
        }

        let batches = oracle.batches.lock().unwrap().clone();
        assert_eq!(batches.iter().sum::<usize>(), 5);
        assert!(batches.iter().all(|&n| (1..=2).contains(&n)));
        assert_eq!(batcher.queued().await, 0);
    }

    /// Lets a test keep a handle on the oracle the batcher owns.
    struct SharedOracle(Arc<EchoTokenOracle>);

    #[async_trait]
    impl StepOracle<MockTensor> for SharedOracle {
        type State = Vec<u32>;

        async fn init(&self, context: &MockTensor, beam_width: usize) -> Result<Vec<u32>, BeamError> {
            self.0.init(context, beam_width).await
        }

        async fn step(&self, paths: &[Vec<u32>], state: Vec<u32>) -> Result<(MockTensor, Vec<u32>), BeamError> {
            self.0.step(paths, state).await
        }
    }

    #[tokio::test]
    async fn test_rejects_multi_row_context() {
        let batcher = BeamSearchBatchInference::<MockTensor, 4>::new(
            EchoTokenOracle::new(),
            BeamSearchConfig::greedy(),
        )
        .unwrap();

        let two_rows = MockTensor::new(vec![2, 1], vec![3.0, 4.0]);
        let err = batcher.run(two_rows).await.await.unwrap_err();
        assert!(matches!(err, BeamError::RequestShape { ref found } if found == &vec![2, 1]));
        assert_eq!(batcher.queued().await, 0);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_requester() {
        let batcher = BeamSearchBatchInference::<MockTensor, 4>::new(
            EchoTokenOracle::failing(),
            BeamSearchConfig::greedy(),
        )
        .unwrap();

        let items = vec![batcher.run(request(3)).await, batcher.run(request(4)).await];
        for result in join_all(items).await {
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), "tensor backend error: device lost");
        }
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_up_front() {
        let result = BeamSearchBatchInference::<MockTensor, 4>::new(
            EchoTokenOracle::new(),
            BeamSearchConfig::new(0),
        );
        assert!(matches!(result, Err(BeamError::InvalidBeamWidth(0))));
    }

    #[tokio::test]
    async fn test_worker_runs_until_dropped() {
        let batcher = BeamSearchBatchInference::<MockTensor, 4>::new(
            EchoTokenOracle::new(),
            BeamSearchConfig::greedy(),
        )
        .unwrap();
        assert!(batcher.is_running());
        drop(batcher);
    }
}
