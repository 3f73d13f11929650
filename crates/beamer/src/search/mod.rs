//! # Beam Search
//!
//! Batched beam search over an external next-token model.
//!
//! ## Module Structure
//!
//! * [`config`] - Search parameters, presets and validation
//! * [`penalty`] - Length penalties used when ranking hypotheses
//! * [`state`] - Per-beam bookkeeping and the search output
//! * [`combine`] - Masking finished beams and scoring candidate extensions
//! * [`select`] - Per-row top-k selection with an explicit tie-break
//! * [`gather`] - Reindexing beams after selection
//! * [`termination`] - Length freezing, forced finalization and output
//! * [`decoder`] - The driver tying the pieces to a [`StepOracle`]
//!
//! ## Layout
//!
//! All per-beam arrays are flattened over `(batch row, beam)`. Beams of batch
//! row `r` occupy slots `[r * K, (r + 1) * K)` and never leave their row.

pub mod combine;
pub mod config;
pub mod decoder;
pub mod gather;
pub mod penalty;
pub mod select;
pub mod state;
pub mod termination;
mod core_trait;

pub use config::{BeamSearchConfig, TieBreak, DEFAULT_END_TOKEN, DEFAULT_START_TOKEN};
pub use core_trait::StepOracle;
pub use decoder::BeamSearch;
pub use penalty::{GnmtLengthPenalty, LengthPenalty, NoLengthPenalty};
pub use state::{BatchShape, BeamState, Hypothesis, SearchOutput};
