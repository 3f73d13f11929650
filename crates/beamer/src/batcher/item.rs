use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use crate::error::BeamError;

/// # Item
///
/// The pending result of a batched search request.
///
/// Resolves once the worker has searched the batch holding the request. A
/// worker that goes away without answering yields [`BeamError::WorkerClosed`].
pub struct Item<T> {
    receiver: oneshot::Receiver<Result<T, BeamError>>,
}

impl<T> Item<T> {
    pub fn new(receiver: oneshot::Receiver<Result<T, BeamError>>) -> Self {
        Self { receiver }
    }
}

impl<T> Future for Item<T> {
    type Output = Result<T, BeamError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(BeamError::WorkerClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
