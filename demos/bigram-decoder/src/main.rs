mod model;

use std::sync::Arc;
use candle_core::{Device, Tensor};
use beamer::batcher::{BeamSearchBatchInference, BeamSearchBatcher};
use beamer::{BeamError, BeamSearch, BeamSearchConfig, GnmtLengthPenalty, Hypothesis};
use log::info;
use crate::model::{BigramModel, VOCAB};

fn render(hypothesis: &Hypothesis) -> String {
    let words: Vec<&str> = hypothesis
        .tokens
        .iter()
        .map(|&t| VOCAB.get(t as usize).copied().unwrap_or("<unk>"))
        .collect();
    format!("{:>8.3}  {}", hypothesis.score, words.join(" "))
}

#[tokio::main]
async fn main() -> Result<(), BeamError> {
    env_logger::init();
    let device = Device::Cpu;
    let config = BeamSearchConfig::new(3)
        .with_max_len(10)
        .with_length_penalty(GnmtLengthPenalty::default())
        .sorted(true);

    // one batched search over two prompts
    let model = BigramModel::new(&device)?;
    let neutral = [0.0; 8];
    let likes_mats = [0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 2.0];
    let context = model.context(&[neutral, likes_mats])?;
    let output = BeamSearch::new(config.clone()).search(&model, &context).await?;
    info!("batched search took {} rounds (forced: {})", output.steps, output.forced);
    for (row, hypotheses) in output.hypotheses.iter().enumerate() {
        println!("prompt {}", row);
        for hypothesis in hypotheses {
            println!("  {}", render(hypothesis));
        }
    }

    // the same prompts submitted concurrently through the batcher
    let batcher = Arc::new(BeamSearchBatchInference::<Tensor, 4>::new(BigramModel::new(&device)?, config)?);
    let handles = [neutral, likes_mats, neutral, likes_mats]
        .into_iter()
        .enumerate()
        .map(|(idx, bias)| {
            let batcher = batcher.clone();
            let context = model.context(&[bias]);
            tokio::spawn(async move {
                let hypotheses = batcher.run(context?).await.await?;
                Ok::<_, BeamError>((idx, hypotheses))
            })
        })
        .collect::<Vec<_>>();

    for handle in futures::future::join_all(handles).await {
        match handle {
            Ok(Ok((idx, hypotheses))) => {
                if let Some(best) = hypotheses.first() {
                    println!("request {} best: {}", idx, render(best));
                }
            }
            Ok(Err(e)) => println!("request failed: {}", e),
            Err(e) => println!("Err joining handle: {:?}", e),
        }
    }
    Ok(())
}
