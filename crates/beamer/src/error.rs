//! Error type shared by the search core, the tensor backends and the batcher.

use std::error::Error as StdError;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Every failure a beam search can surface.
///
/// All variants are fatal for the search that produced them: the algorithm is
/// deterministic and single-pass, so nothing is retried. The type is `Clone`
/// so the batcher can hand the same failure to every requester of a batch.
#[derive(Debug, Clone, Error)]
pub enum BeamError {
    /// Beam width must be at least one.
    #[error("beam width must be at least 1, got {0}")]
    InvalidBeamWidth(usize),

    /// Maximum decode length must be at least one.
    #[error("max length must be at least 1, got {0}")]
    InvalidMaxLength(usize),

    /// The context tensor has no batch rows (or no batch dimension at all).
    #[error("context has no batch rows (shape {shape:?})")]
    EmptyBatch { shape: Vec<usize> },

    /// Step 0 only ranks one beam's `V` candidates, so `K` cannot exceed `V`.
    #[error("beam width {beam_width} exceeds vocabulary size {vocab}")]
    BeamTooWide { beam_width: usize, vocab: usize },

    /// A special token does not index into the vocabulary.
    #[error("token {token} is out of range for vocabulary size {vocab}")]
    TokenOutOfRange { token: u32, vocab: usize },

    /// The oracle changed vocabulary size between steps.
    #[error("vocabulary size changed from {expected} to {found}")]
    VocabMismatch { expected: usize, found: usize },

    /// The oracle returned log-probabilities of the wrong shape.
    #[error("log-probabilities have shape {found:?}, expected [{rows}, V]")]
    LogProbShape { rows: usize, found: Vec<usize> },

    /// Auxiliary state does not hold one entry per beam.
    #[error("auxiliary state holds {found} beams, expected {expected}")]
    StateBatchMismatch { expected: usize, found: usize },

    /// A tensor backend operation failed.
    #[error("tensor backend error: {0}")]
    Backend(String),

    /// The step oracle failed on its own terms.
    #[error("step oracle failed: {0}")]
    Oracle(#[source] Arc<dyn StdError + Send + Sync>),

    /// A batched request must carry exactly one context row.
    #[error("batched requests take a single context row, got shape {found:?}")]
    RequestShape { found: Vec<usize> },

    /// The batching worker went away before answering a request.
    #[error("batch worker closed before replying")]
    WorkerClosed,
}

impl BeamError {
    /// Wrap a backend failure, keeping only its message.
    pub fn backend(err: impl Display) -> Self {
        Self::Backend(err.to_string())
    }

    /// Wrap an oracle-side error as the source of a [`BeamError::Oracle`].
    pub fn oracle<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Oracle(Arc::new(err))
    }
}
