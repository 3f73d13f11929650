use crate::backend::{AuxState, Backend};
use crate::error::BeamError;

// A dense row-major tensor for tests
#[derive(Clone, Debug, PartialEq)]
pub struct MockTensor {
    pub(crate) shape: Vec<usize>,
    pub(crate) data: Vec<f32>,
}

impl MockTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len(), "shape does not cover data");
        Self { shape, data }
    }

    /// Build a `[rows, width]` tensor from equally sized rows.
    pub fn from_rows(rows: &[Vec<f32>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        Self::new(vec![rows.len(), width], data)
    }

    fn row_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }
}

impl Backend for MockTensor {
    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn cat(tensors: &[Self], dim: usize) -> Result<Self, BeamError> {
        if dim != 0 {
            return Err(BeamError::backend("mock tensors only concatenate along dim 0"));
        }
        let first = tensors.first().ok_or_else(|| BeamError::backend("nothing to concatenate"))?;
        let mut shape = first.shape.clone();
        shape[0] = tensors.iter().map(|t| t.shape[0]).sum();
        let data = tensors.iter().flat_map(|t| t.data.iter().copied()).collect();
        Ok(MockTensor::new(shape, data))
    }

    fn index_select(&self, indices: &[usize]) -> Result<Self, BeamError> {
        let width = self.row_len();
        let mut data = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            if i >= self.shape[0] {
                return Err(BeamError::backend(format!("row {} out of bounds", i)));
            }
            data.extend_from_slice(&self.data[i * width..(i + 1) * width]);
        }
        let mut shape = self.shape.clone();
        shape[0] = indices.len();
        Ok(MockTensor::new(shape, data))
    }

    fn to_f32_vec(&self) -> Result<Vec<f32>, BeamError> {
        Ok(self.data.clone())
    }
}

impl AuxState for MockTensor {
    fn batch_len(&self) -> Option<usize> {
        self.shape.first().copied()
    }

    fn reorder(self, indices: &[usize]) -> Result<Self, BeamError> {
        self.index_select(indices)
    }
}
