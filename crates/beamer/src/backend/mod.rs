//! # Tensor Backend
//!
//! This module provides a unified interface for different tensor backends,
//! allowing beam search to read oracle outputs and shuffle decoder state in a
//! backend-agnostic manner.

//! ## Feature Flags
//!
//! The module uses feature flags to conditionally compile support for different backends:
//!
//! - `candle`: Enables support for the Candle tensor library
//! - `burn`: Enables support for the Burn tensor library
//!
//! ## Usage
//!
//! Oracles return log-probabilities as any [`Backend`] tensor. Decoder state
//! that must follow the beams implements [`AuxState`]; both framework tensors
//! get an implementation that reorders rows with a batch-dimension gather.

mod core_trait;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor backend implementation.
///
/// This module is only available when the `candle` feature flag is enabled.
/// It provides an implementation of the [`Backend`] and [`AuxState`] traits
/// for Candle's `Tensor` type.
pub mod candle;

#[cfg_attr(docsrs, doc(cfg(feature = "burn")))]
#[cfg(feature = "burn")]
/// Burn tensor backend implementation.
///
/// This module is only available when the `burn` feature flag is enabled.
/// Burn tensors carry their rank as a const generic, so the implementation is
/// generic over that rank rather than over a single tensor type.
pub mod burn;


// Re-export the core traits for convenient imports
pub use core_trait::*;


#[cfg(test)]
/// Mock tensor implementation.
///
/// Operates on simple dense vectors
pub(crate) mod mock_tensor;
