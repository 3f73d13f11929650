use std::fmt::Debug;
use crate::error::BeamError;


/// The backend trait that must be fulfilled by any tensor type the search reads from.
///
/// Beam search never does arithmetic on backend tensors. It only needs to
/// check shapes, pull log-probabilities back to the host, and move whole
/// batch rows around (tiling contexts, reordering auxiliary state, joining
/// batched requests). Dimension `0` is always the batch dimension.
pub trait Backend: Debug + Clone + Send + Sync + 'static {
    /// Return the shape of this tensor
    fn shape(&self) -> Vec<usize>;

    /// Concatenate several tensors to each other along dimension `dim`, in the order supplied
    fn cat(tensors: &[Self], dim: usize) -> Result<Self, BeamError>;

    /// Build a new tensor from the batch rows at `indices`, in order.
    ///
    /// Indices may repeat; each occurrence produces its own copy of the row.
    fn index_select(&self, indices: &[usize]) -> Result<Self, BeamError>;

    /// Copy every element to the host as `f32`, in row-major order
    fn to_f32_vec(&self) -> Result<Vec<f32>, BeamError>;
}


/// Auxiliary decoder state that lives alongside the beams.
///
/// The state is treated as an array of opaque rows, one per beam slot. After
/// every selection round the search hands the oracle the flat origin index of
/// each surviving slot, and the default reorder copies row `indices[i]` into
/// slot `i`.
pub trait AuxState: Sized {
    /// Number of beam rows held, or `None` when the state is not row-addressable.
    fn batch_len(&self) -> Option<usize>;

    /// Reorder rows so that slot `i` holds the old row `indices[i]`.
    fn reorder(self, indices: &[usize]) -> Result<Self, BeamError>;
}

/// Stateless oracles carry `()`.
impl AuxState for () {
    fn batch_len(&self) -> Option<usize> {
        None
    }

    fn reorder(self, _indices: &[usize]) -> Result<Self, BeamError> {
        Ok(())
    }
}

impl<T: Clone> AuxState for Vec<T> {
    fn batch_len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn reorder(self, indices: &[usize]) -> Result<Self, BeamError> {
        crate::tensor::operations::gather_rows(&self, indices)
    }
}
