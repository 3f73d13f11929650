use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use log::trace;
use tokio::sync::{Mutex, Notify};
use tokio::time::error::Elapsed;
use super::handler::BatchHandler;

/// How long an idle worker waits before re-checking the running flag
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Drains up to `S` queued requests at a time and runs them through `handler`.
///
/// Runs until `running` is cleared. Every drained batch is answered before
/// the next one is taken, so batches never overlap.
pub async fn batching_loop<BH: BatchHandler, const S: usize>(
    handler: &BH,
    running: Arc<AtomicBool>,
    notifier: Arc<Notify>,
    waiting_requests: Arc<Mutex<Vec<BH::Request>>>,
) {
    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let batch = drain_compatible_requests(
            S,
            &waiting_requests,
            |first, other| handler.can_batch(first, other),
        ).await;

        if batch.is_empty() {
            // Nothing queued, wait for a notification or check again later
            let _ = timeout_await_notifier(&notifier).await;
            continue;
        }

        trace!("processing batch of {}", batch.len());
        let output = match handler.make_batch_input(&batch).await {
            Ok(input) => handler.forward(&input).await,
            Err(err) => Err(err),
        };
        handler.handle_outputs(batch, output).await;
    }
}

#[inline]
async fn timeout_await_notifier(notifier: &Notify) -> Result<(), Elapsed> {
    tokio::time::timeout(IDLE_POLL, notifier.notified()).await
}

/// Takes up to `batch_size` requests that can share a batch with the oldest one.
///
/// Skipped requests keep their queue order.
async fn drain_compatible_requests<T, F>(
    batch_size: usize,
    waiting_requests: &Mutex<Vec<T>>,
    can_batch: F,
) -> Vec<T>
where
    F: Fn(&T, &T) -> bool,
{
    let mut requests = waiting_requests.lock().await;
    if requests.is_empty() {
        return vec![];
    }

    let limit = batch_size.max(1);
    let mut taken = Vec::with_capacity(limit.min(requests.len()));
    let mut kept = Vec::new();
    for request in requests.drain(..) {
        if taken.len() < limit && taken.first().is_none_or(|first| can_batch(first, &request)) {
            taken.push(request);
        } else {
            kept.push(request);
        }
    }
    *requests = kept;
    taken
}
