use crate::backend::Backend;
use crate::error::BeamError;
use super::constant::{BATCH_DIM, VOCAB_DIM};

/// Tiles every batch row `k` times while keeping rows of one example adjacent.
///
/// A context of shape `(batch, ...)` becomes `(batch * k, ...)` where rows
/// `[i * k, (i + 1) * k)` are copies of input row `i`. This is the layout the
/// search uses for beam slots, so an oracle can call this from
/// [`StepOracle::init`](crate::search::StepOracle::init) to give every beam
/// its own copy of the encoder output.
///
/// # Parameters
///
/// * `tensor` - Tensor of shape `(batch, ...)`
/// * `k` - Number of copies of each row, normally the beam width
///
/// # Returns
///
/// A tensor of shape `(batch * k, ...)`.
pub fn repeat_batch<B>(tensor: &B, k: usize) -> Result<B, BeamError>
where B: Backend
{
    let batch = batch_size(tensor)?;
    let indices: Vec<usize> = (0..batch)
        .flat_map(|row| std::iter::repeat(row).take(k))
        .collect();
    tensor.index_select(&indices)
}


/// Gathers rows of a host-side array by index.
///
/// Slot `i` of the result is a clone of `rows[indices[i]]`. The input is only
/// read, so an index may appear several times or point at its own slot.
pub fn gather_rows<T>(rows: &[T], indices: &[usize]) -> Result<Vec<T>, BeamError>
where T: Clone
{
    indices
        .iter()
        .map(|&i| {
            rows.get(i).cloned().ok_or_else(|| {
                BeamError::backend(format!("row {} out of bounds for {} rows", i, rows.len()))
            })
        })
        .collect()
}


/// Returns the size of the batch dimension.
///
/// Fails with [`BeamError::EmptyBatch`] when the tensor has no batch
/// dimension or the batch dimension is empty.
pub(crate) fn batch_size<B>(tensor: &B) -> Result<usize, BeamError>
where B: Backend
{
    let shape = tensor.shape();
    match shape.get(BATCH_DIM) {
        Some(&rows) if rows > 0 => Ok(rows),
        _ => Err(BeamError::EmptyBatch { shape }),
    }
}


/// Reads a `(rows, vocab)` log-probability tensor back to the host.
///
/// # Returns
///
/// The flattened row-major values and the vocabulary size.
pub(crate) fn read_log_probs<B>(tensor: &B, rows: usize) -> Result<(Vec<f32>, usize), BeamError>
where B: Backend
{
    let shape = tensor.shape();
    if shape.len() != 2 || shape[BATCH_DIM] != rows {
        return Err(BeamError::LogProbShape { rows, found: shape });
    }
    let values = tensor.to_f32_vec()?;
    Ok((values, shape[VOCAB_DIM]))
}


/// Joins `[1, ...]` contexts into a single `[n, ...]` batch.
#[cfg_attr(not(feature = "batcher"), allow(dead_code))]
pub(crate) fn stack_contexts<B>(contexts: &[B]) -> Result<B, BeamError>
where B: Backend
{
    B::cat(contexts, BATCH_DIM)
}
