//! Beam State and Result Types

/// Dimensions fixed for one search invocation.
///
/// The vocabulary size `V` is not known until the oracle answers the first
/// step, so it is pinned separately in [`BeamState::vocab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    /// Number of independent input examples (`B`)
    pub batch: usize,

    /// Hypotheses kept per example (`K`)
    pub beam_width: usize,
}

impl BatchShape {
    pub fn new(batch: usize, beam_width: usize) -> Self {
        Self { batch, beam_width }
    }

    /// Total number of beam slots, `B * K`
    pub fn beams(&self) -> usize {
        self.batch * self.beam_width
    }

    /// Flat slot index of local beam `beam` in batch row `row`
    pub fn flat(&self, row: usize, beam: usize) -> usize {
        row * self.beam_width + beam
    }
}

/// Per-beam bookkeeping for a batched search.
///
/// Every array is flattened over `(batch row, beam)` in row-major order, so the
/// beams of batch row `r` occupy slots `[r * K, (r + 1) * K)`. Finished beams
/// stay in place; the number of slots never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamState {
    pub(crate) shape: BatchShape,

    /// Completed selection rounds
    pub(crate) step: usize,

    /// Vocabulary size, fixed by the first step
    pub(crate) vocab: Option<usize>,

    pub(crate) paths: Vec<Vec<u32>>,

    /// `0` while open; the 1-based step that emitted END once finished
    pub(crate) lengths: Vec<usize>,

    /// Cumulative log-probability with no length penalty applied
    pub(crate) log_probs: Vec<f32>,
}

impl BeamState {
    /// Fresh state: every path is `[start_token]`, every score and length zero.
    pub fn new(shape: BatchShape, start_token: u32) -> Self {
        let beams = shape.beams();
        Self {
            shape,
            step: 0,
            vocab: None,
            paths: vec![vec![start_token]; beams],
            lengths: vec![0; beams],
            log_probs: vec![0.0; beams],
        }
    }

    pub fn shape(&self) -> BatchShape {
        self.shape
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn vocab(&self) -> Option<usize> {
        self.vocab
    }

    /// All paths, START token included
    pub fn paths(&self) -> &[Vec<u32>] {
        &self.paths
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn log_probs(&self) -> &[f32] {
        &self.log_probs
    }

    pub fn is_finished(&self, slot: usize) -> bool {
        self.lengths[slot] != 0
    }

    pub fn finished_count(&self) -> usize {
        self.lengths.iter().filter(|&&l| l != 0).count()
    }

    /// Every beam of every batch row has emitted END.
    pub fn all_finished(&self) -> bool {
        self.lengths.iter().all(|&l| l != 0)
    }

    /// Beams of one batch row, as a slot range
    pub fn row_slots(&self, row: usize) -> std::ops::Range<usize> {
        let k = self.shape.beam_width;
        row * k..(row + 1) * k
    }
}

/// One finished hypothesis in the search output.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Generated tokens, START stripped, ending with END
    pub tokens: Vec<u32>,

    /// Number of generated tokens including END
    pub length: usize,

    /// `log_prob / length_penalty(length)`
    pub score: f32,

    /// Cumulative log-probability with no penalty applied
    pub log_prob: f32,
}

/// Result of a batched beam search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutput {
    /// `K` hypotheses for each batch row
    pub hypotheses: Vec<Vec<Hypothesis>>,

    /// Selection rounds run by the main loop
    pub steps: usize,

    /// Whether open beams had to be closed at the length limit
    pub forced: bool,
}

impl SearchOutput {
    /// Highest-scoring hypothesis of a batch row
    pub fn best(&self, row: usize) -> Option<&Hypothesis> {
        self.hypotheses.get(row)?.iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}
