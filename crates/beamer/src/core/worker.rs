//! Lifetime management for the task that runs batched beam searches.

use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use log::debug;
use tokio::{task::JoinHandle, sync::Notify};

/// Handle to the background task of a
/// [`BeamSearchBatchInference`](crate::batcher::BeamSearchBatchInference).
///
/// The task runs [`batching_loop`](super::batch::batching_loop): it stacks
/// queued single-row contexts into one batch, searches it and answers every
/// requester. It is handed a running flag and a notifier when spawned. The
/// batcher calls [`notify`](Self::notify) after queueing a context and drops
/// the handle when it is dropped itself, which stops the loop once the
/// search in flight returns.
pub struct BatchWorkerHandle {
    /// Cleared to ask the task to exit
    running: Arc<AtomicBool>,

    /// `None` once shutdown has started
    handle: Option<JoinHandle<()>>,

    notifier: Arc<Notify>,
}

impl BatchWorkerHandle {
    /// Spawns the task through `task`, handing it the shared flag and notifier.
    pub fn new<F>(task: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>, Arc<Notify>) -> JoinHandle<()> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let notifier = Arc::new(Notify::new());
        let handle = task(running.clone(), notifier.clone());

        Self {
            running,
            handle: Some(handle),
            notifier,
        }
    }

    /// Wakes the task so it picks up newly queued contexts.
    ///
    /// Ignored after shutdown, so a stopped loop is never woken again.
    pub fn notify(&self) {
        if self.running.load(Ordering::SeqCst) {
            self.notifier.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Clears the running flag, wakes the task and detaches a waiter for it.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.notifier.notify_one();

        if let Some(handle) = self.handle.take() {
            debug!("stopping beam search worker");
            tokio::spawn(async move {
                let _ = handle.await;
            });
        }
    }
}

impl Drop for BatchWorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
