/// # Constants with reserved meanings in beamer

/// In a given tensor shape, beamer reserves the `0th` dimension for batching.
/// For beam-shaped tensors this is the flattened `batch * beam` dimension.
pub const BATCH_DIM: usize = 0;

/// In a log-probability tensor of shape `(batch * beam, vocab)`, the vocabulary dimension
pub const VOCAB_DIM: usize = 1;
