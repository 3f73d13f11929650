//! # Batching Core
//!
//! Machinery for collecting concurrent requests into batches on one
//! background task.
//!
//! * [`batch`] - The loop that drains queued requests and runs them through a handler
//! * [`handler`] - The [`BatchHandler`](handler::BatchHandler) trait a batch front end implements
//! * [`worker`] - Spawning, waking and stopping the background task
pub mod worker;
pub mod batch;
pub mod handler;
