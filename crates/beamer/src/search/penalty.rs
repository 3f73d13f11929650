//! Length penalties applied when ranking hypotheses.
//!
//! A penalty divides a cumulative log-probability at scoring time only; it is
//! never folded into the running sum kept in the beam state.

/// A scoring policy over hypothesis length.
///
/// Implemented for any `Fn(usize) -> f32`, so ad-hoc penalties can be passed
/// as closures.
pub trait LengthPenalty: Send + Sync {
    /// The divisor applied to a log-probability for a hypothesis of `length` tokens.
    fn penalty(&self, length: usize) -> f32;

    /// Normalize a cumulative log-probability for ranking.
    fn apply(&self, log_prob: f32, length: usize) -> f32 {
        log_prob / self.penalty(length)
    }
}

impl<F> LengthPenalty for F
where
    F: Fn(usize) -> f32 + Send + Sync,
{
    fn penalty(&self, length: usize) -> f32 {
        self(length)
    }
}

/// Constant penalty of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLengthPenalty;

impl LengthPenalty for NoLengthPenalty {
    fn penalty(&self, _length: usize) -> f32 {
        1.0
    }
}

/// The GNMT penalty `(5 + |Y|)^alpha / (5 + 1)^alpha` (Wu et al., 2016).
///
/// Computed as `((5 + |Y|) / 6)^alpha`.
#[derive(Debug, Clone, Copy)]
pub struct GnmtLengthPenalty {
    pub alpha: f32,
}

impl GnmtLengthPenalty {
    pub const fn new(alpha: f32) -> Self {
        Self { alpha }
    }
}

impl Default for GnmtLengthPenalty {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl LengthPenalty for GnmtLengthPenalty {
    fn penalty(&self, length: usize) -> f32 {
        ((5.0 + length as f32) / 6.0).powf(self.alpha)
    }
}
