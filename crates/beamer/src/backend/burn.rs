//! The burn implementation for backend provision.
//! Burn tensors are constrained with const generic ranks, so the impls are
//! written once for every rank `D` of float tensor.
use super::{AuxState, Backend};
use crate::error::BeamError;
use crate::tensor::constant::BATCH_DIM;
use burn::tensor::backend::Backend as BurnBackend;
use burn::tensor::{Int, Tensor, TensorData};

fn batch_indices<B: BurnBackend>(indices: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let ids: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
    Tensor::<B, 1, Int>::from_data(TensorData::new(ids, [indices.len()]), device)
}

impl<B, const D: usize> Backend for Tensor<B, D>
where
    B: BurnBackend,
{
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    fn cat(tensors: &[Self], dim: usize) -> Result<Self, BeamError> {
        if tensors.is_empty() {
            return Err(BeamError::backend("cannot concatenate an empty tensor list"));
        }
        Ok(Tensor::cat(tensors.to_vec(), dim))
    }

    fn index_select(&self, indices: &[usize]) -> Result<Self, BeamError> {
        let ids = batch_indices::<B>(indices, &self.device());
        Ok(self.clone().select(BATCH_DIM, ids))
    }

    fn to_f32_vec(&self) -> Result<Vec<f32>, BeamError> {
        self.to_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| BeamError::backend(format!("{e:?}")))
    }
}

impl<B, const D: usize> AuxState for Tensor<B, D>
where
    B: BurnBackend,
{
    fn batch_len(&self) -> Option<usize> {
        Some(self.dims()[BATCH_DIM])
    }

    fn reorder(self, indices: &[usize]) -> Result<Self, BeamError> {
        Backend::index_select(&self, indices)
    }
}
