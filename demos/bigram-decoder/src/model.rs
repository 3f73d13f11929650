use async_trait::async_trait;
use candle_core::{Device, DType, Tensor};
use beamer::{repeat_batch, BeamError, StepOracle};

pub const VOCAB: [&str; 8] = ["<pad>", "<s>", "</s>", "the", "cat", "sat", "on", "mat"];

/// A bigram language model: the next token depends only on the last one.
///
/// Each context row is a `[V]` bias added to every step's logits, so
/// different prompts steer the same table in different directions.
pub struct BigramModel {
    /// `[V, V]` logits, row = previous token
    table: Tensor,
    device: Device,
}

impl BigramModel {
    pub fn new(device: &Device) -> Result<Self, BeamError> {
        let v = VOCAB.len();
        let mut logits = vec![-4f32; v * v];
        let mut prefer = |from: usize, to: usize, weight: f32| logits[from * v + to] = weight;
        // <s> the cat sat on the mat </s>
        prefer(1, 3, 2.0);
        prefer(3, 4, 1.5);
        prefer(3, 7, 1.2);
        prefer(4, 5, 2.0);
        prefer(4, 2, 0.5);
        prefer(5, 6, 1.8);
        prefer(5, 2, 1.0);
        prefer(6, 3, 2.0);
        prefer(7, 2, 2.5);
        prefer(2, 2, 0.0);
        let table = Tensor::from_vec(logits, (v, v), device).map_err(BeamError::backend)?;
        Ok(Self { table, device: device.clone() })
    }

    /// A `[n, V]` context of per-prompt biases.
    pub fn context(&self, biases: &[[f32; 8]]) -> Result<Tensor, BeamError> {
        let flat: Vec<f32> = biases.iter().flatten().copied().collect();
        Tensor::from_vec(flat, (biases.len(), VOCAB.len()), &self.device).map_err(BeamError::backend)
    }

    fn log_softmax(logits: &Tensor) -> candle_core::Result<Tensor> {
        let max = logits.max_keepdim(1)?;
        let shifted = logits.broadcast_sub(&max)?;
        let lse = shifted.exp()?.sum_keepdim(1)?.log()?;
        shifted.broadcast_sub(&lse)
    }

    fn next_token_log_probs(&self, paths: &[Vec<u32>], bias: &Tensor) -> candle_core::Result<Tensor> {
        let last: Vec<u32> = paths.iter().map(|p| p.last().copied().unwrap_or(1)).collect();
        let ids = Tensor::from_vec(last, paths.len(), &self.device)?;
        let logits = (self.table.index_select(&ids, 0)? + bias)?;
        Self::log_softmax(&logits.to_dtype(DType::F32)?)
    }
}

#[async_trait]
impl StepOracle<Tensor> for BigramModel {
    /// The context bias of every beam slot
    type State = Tensor;

    async fn init(&self, context: &Tensor, beam_width: usize) -> Result<Tensor, BeamError> {
        repeat_batch(context, beam_width)
    }

    async fn step(&self, paths: &[Vec<u32>], state: Tensor) -> Result<(Tensor, Tensor), BeamError> {
        let log_probs = self.next_token_log_probs(paths, &state).map_err(BeamError::oracle)?;
        Ok((log_probs, state))
    }
}
