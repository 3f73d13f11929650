use super::{AuxState, Backend};
use crate::error::BeamError;
use crate::tensor::constant::BATCH_DIM;
use candle_core::{DType, Tensor};

impl Backend for Tensor {
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn cat(tensors: &[Self], dim: usize) -> Result<Self, BeamError> {
        Tensor::cat(tensors, dim).map_err(BeamError::backend)
    }

    fn index_select(&self, indices: &[usize]) -> Result<Self, BeamError> {
        let ids: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
        let ids = Tensor::from_vec(ids, indices.len(), self.device())
            .map_err(BeamError::backend)?;
        Tensor::index_select(self, &ids, BATCH_DIM).map_err(BeamError::backend)
    }

    fn to_f32_vec(&self) -> Result<Vec<f32>, BeamError> {
        self.to_dtype(DType::F32)
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(BeamError::backend)
    }
}

impl AuxState for Tensor {
    fn batch_len(&self) -> Option<usize> {
        self.dims().first().copied()
    }

    fn reorder(self, indices: &[usize]) -> Result<Self, BeamError> {
        Backend::index_select(&self, indices)
    }
}
