//! # Beamer
//!
//! Batched **beam** search decoding over pluggable tensor backends.
//!
//! ## Overview
//!
//! Beam search keeps the `K` best partial hypotheses for each of `B` input
//! examples and extends them one token at a time. The model is an external
//! collaborator: anything implementing [`StepOracle`] can be decoded, as long
//! as it returns next-token log-probabilities for every beam.
//!
//! Key components include:
//!
//! - A search driver ([`BeamSearch`]) with masking of finished beams, length
//!   penalties, deterministic top-k selection and forced finalization
//! - A tensor abstraction layer supporting various backends
//! - An optional request batcher that merges concurrent single-row searches
//!
//! ## Architecture
//!
//! ### Assumptions
//! Regardless of backend used, beamer reserves one dimension with a special meaning:
//!  - The `0th` dimension is the batch dimension. For per-beam tensors it is
//!    the flattened `batch * beam` dimension, with the beams of one example
//!    stored next to each other
//!  - Oracle output is a 2-d `(batch * beam, vocab)` tensor of log-probabilities
//!
//! ### Backend Traits
//!
//! The [`Backend`](backend::Backend) trait is all the search needs from a
//! tensor: its shape, row gathers and concatenation along the batch
//! dimension, and a copy to the host. [`AuxState`](backend::AuxState) marks
//! decoder state that has to follow the beams when they are reordered.
//!
//! ### Search
//!
//! Every round combines the oracle output with the running scores, keeps the
//! `K` best candidates of each row, rebuilds the beam paths and freezes the
//! length of beams that produced END. The loop stops once every beam has
//! finished, or closes the open beams with END at the maximum length.
//!
//! ## Features
//!
//! - **batcher** - Enables the request batcher (default)
//! - **candle** - Enables candle backend
//! - **burn** - Enables burn backend
//!
//! ## Example
//!
//! ```ignore
//! use beamer::{BeamSearch, BeamSearchConfig, GnmtLengthPenalty};
//!
//! let config = BeamSearchConfig::new(4)
//!     .with_max_len(64)
//!     .with_length_penalty(GnmtLengthPenalty::default())
//!     .sorted(true);
//! let output = BeamSearch::new(config).search(&decoder, &encoded).await?;
//! let best = output.best(0);
//! ```

mod error;
mod tensor;

pub mod backend;
pub mod search;

#[cfg(feature = "batcher")]
mod core;

#[cfg_attr(docsrs, doc(cfg(feature = "batcher")))]
#[cfg(feature = "batcher")]
pub mod batcher;

/// Constants for client reference
pub use tensor::constant;

pub use error::BeamError;
pub use tensor::operations::{gather_rows, repeat_batch};
pub use search::{
    BeamSearch,
    BeamSearchConfig,
    GnmtLengthPenalty,
    Hypothesis,
    LengthPenalty,
    NoLengthPenalty,
    SearchOutput,
    StepOracle,
    TieBreak,
};
