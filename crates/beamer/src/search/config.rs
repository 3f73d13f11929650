//! Beam Search Configuration

use std::fmt;
use std::sync::Arc;
use crate::error::BeamError;
use super::penalty::{LengthPenalty, NoLengthPenalty};

/// Token id seeded into every path before the first step.
pub const DEFAULT_START_TOKEN: u32 = 1;

/// Token id that finishes a hypothesis.
pub const DEFAULT_END_TOKEN: u32 = 2;

/// How equal candidate scores are ordered during top-k selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The candidate with the lower flat `beam * V + token` index ranks first.
    #[default]
    LowestIndex,

    /// The candidate with the higher flat index ranks first.
    HighestIndex,
}

/// Beam search configuration parameters
#[derive(Clone)]
pub struct BeamSearchConfig {
    /// Number of hypotheses kept per batch row (`K`)
    pub beam_width: usize,

    /// Maximum number of generated tokens per hypothesis, END included.
    ///
    /// Hypotheses still open after `max_len - 1` steps are closed with a
    /// forced END token.
    pub max_len: usize,

    /// Synthetic token every path starts with; stripped from the output
    pub start_token: u32,

    /// Token that finishes a hypothesis
    pub end_token: u32,

    /// Scoring policy over hypothesis length
    pub length_penalty: Arc<dyn LengthPenalty>,

    /// Ordering of equal scores during selection
    pub tie_break: TieBreak,

    /// Sort each row's final hypotheses by descending score.
    ///
    /// When unset, hypotheses keep the order of the last selection round.
    pub sort_by_score: bool,
}

impl Default for BeamSearchConfig {
    fn default() -> Self {
        Self {
            beam_width: 4,
            max_len: 100,
            start_token: DEFAULT_START_TOKEN,
            end_token: DEFAULT_END_TOKEN,
            length_penalty: Arc::new(NoLengthPenalty),
            tie_break: TieBreak::default(),
            sort_by_score: false,
        }
    }
}

impl fmt::Debug for BeamSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeamSearchConfig")
            .field("beam_width", &self.beam_width)
            .field("max_len", &self.max_len)
            .field("start_token", &self.start_token)
            .field("end_token", &self.end_token)
            .field("tie_break", &self.tie_break)
            .field("sort_by_score", &self.sort_by_score)
            .finish_non_exhaustive()
    }
}

impl BeamSearchConfig {
    /// Create a configuration with the given beam width and defaults elsewhere
    pub fn new(beam_width: usize) -> Self {
        Self {
            beam_width,
            ..Self::default()
        }
    }

    /// Single-beam search, equivalent to greedy arg-max decoding
    pub fn greedy() -> Self {
        Self::new(1)
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_tokens(mut self, start_token: u32, end_token: u32) -> Self {
        self.start_token = start_token;
        self.end_token = end_token;
        self
    }

    pub fn with_length_penalty<P>(mut self, penalty: P) -> Self
    where
        P: LengthPenalty + 'static,
    {
        self.length_penalty = Arc::new(penalty);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn sorted(mut self, sort_by_score: bool) -> Self {
        self.sort_by_score = sort_by_score;
        self
    }

    /// Check the parameters that can be validated without seeing the vocabulary.
    pub fn validate(&self) -> Result<(), BeamError> {
        if self.beam_width < 1 {
            return Err(BeamError::InvalidBeamWidth(self.beam_width));
        }
        if self.max_len < 1 {
            return Err(BeamError::InvalidMaxLength(self.max_len));
        }
        Ok(())
    }

    /// Check the parameters that depend on the vocabulary size.
    pub(crate) fn validate_vocab(&self, vocab: usize) -> Result<(), BeamError> {
        if self.beam_width > vocab {
            return Err(BeamError::BeamTooWide {
                beam_width: self.beam_width,
                vocab,
            });
        }
        for token in [self.start_token, self.end_token] {
            if token as usize >= vocab {
                return Err(BeamError::TokenOutOfRange { token, vocab });
            }
        }
        Ok(())
    }
}
