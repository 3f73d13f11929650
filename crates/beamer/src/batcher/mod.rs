//! # Request Batcher
//!
//! Front end that lets many callers share one beam search.
//!
//! Each caller submits a single `[1, ...]` context through
//! [`BeamSearchBatcher::run`] and awaits the returned [`Item`]. A background
//! task drains up to `S` waiting requests whose contexts share a shape,
//! stacks them along the batch dimension, runs one search and hands every
//! caller the hypotheses of its own row. A failed search is reported to
//! every caller in that batch.
//!
//! ```ignore
//! let batcher = BeamSearchBatchInference::<Tensor, 16>::new(oracle, BeamSearchConfig::new(4))?;
//! let hypotheses = batcher.run(encoded_prompt).await.await?;
//! ```

mod batcher;
mod core_trait;
mod handler;
mod item;
mod queue_item;

pub use batcher::BeamSearchBatchInference;
pub use core_trait::BeamSearchBatcher;
pub use item::Item;
pub use queue_item::SearchReply;
