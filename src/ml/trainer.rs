// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Plain epoch/batch loop over Burn's DataLoader:
//
//   forward → cross-entropy → argmax vs labels → backward → step
//
// Running metrics (loss sum, correct, total, batch count) are
// reset at the start of every epoch and written to the metrics
// sink when it ends.
//
// Key Burn insight:
//   - Training uses an AutodiffBackend for gradients
//   - model.valid() returns the same model on the inner backend
//     for evaluation, with dropout disabled

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};
use crate::data::batcher::CifarBatcher;
use crate::data::dataset::CifarDataset;
use crate::domain::metrics::EpochMetrics;
use crate::domain::traits::MetricsSink;
use crate::ml::evaluator::{count_correct, BatchLoader};
use crate::ml::model::{Vgg, VggConfig};

/// Log a progress line every this many batches
const LOG_EVERY: usize = 100;

// ─── RunningMetrics ───────────────────────────────────────────────────────────
/// Per-epoch accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMetrics {
    pub loss_sum: f64,
    pub correct:  usize,
    pub total:    usize,
    pub batches:  usize,
}

impl RunningMetrics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add one batch: its mean loss, how many were right, and its size
    pub fn update(&mut self, batch_loss: f64, correct: usize, batch_size: usize) {
        self.loss_sum += batch_loss;
        self.correct  += correct;
        self.total    += batch_size;
        self.batches  += 1;
    }

    pub fn average_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    /// Percentage 0..=100
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { 100.0 * self.correct as f64 / self.total as f64 } else { 0.0 }
    }

    pub fn to_epoch(&self, epoch: usize) -> EpochMetrics {
        EpochMetrics::new(epoch, self.average_loss(), self.accuracy())
    }
}

/// Shuffled training loader.
pub fn train_loader<B: Backend>(
    dataset: CifarDataset,
    cfg:     &TrainConfig,
    device:  &B::Device,
) -> BatchLoader<B> {
    DataLoaderBuilder::<B, _, _>::new(CifarBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .set_device(device.clone())
        .build(dataset)
}

/// Build the network, train it for `cfg.epochs` and return the trained model.
pub fn run_training<B: AutodiffBackend, S: MetricsSink>(
    cfg:           &TrainConfig,
    model_cfg:     &VggConfig,
    train_dataset: CifarDataset,
    sink:          &mut S,
    device:        &B::Device,
) -> Result<Vgg<B>> {
    model_cfg.validate()?;
    let model: Vgg<B> = model_cfg.init(device);
    let loader        = train_loader::<B>(train_dataset, cfg, device);

    tracing::info!(
        "Training for {} epochs, {} images per batch, {:?} at lr={}",
        cfg.epochs, cfg.batch_size, cfg.optimizer, cfg.lr
    );

    match cfg.optimizer {
        OptimizerKind::Sgd => {
            let optim = SgdConfig::new().init::<B, Vgg<B>>();
            train_loop(cfg, model, optim, loader, sink)
        }
        OptimizerKind::Adam => {
            let optim = AdamConfig::new().init::<B, Vgg<B>>();
            train_loop(cfg, model, optim, loader, sink)
        }
    }
}

fn train_loop<B, O, S>(
    cfg:       &TrainConfig,
    mut model: Vgg<B>,
    mut optim: O,
    loader:    BatchLoader<B>,
    sink:      &mut S,
) -> Result<Vgg<B>>
where
    B: AutodiffBackend,
    O: Optimizer<Vgg<B>, B>,
    S: MetricsSink,
{
    let mut running = RunningMetrics::default();
    let mut best    = f64::INFINITY;

    for epoch in 1..=cfg.epochs {
        println!("{} epoch {} {}", "*".repeat(25), epoch, "*".repeat(25));
        running.reset();

        for batch in loader.iter() {
            let batch_size = batch.targets.dims()[0];
            let out        = model.forward_classification(batch.images, batch.targets);

            let loss_val: f64 = out.loss.clone().into_scalar().elem::<f64>();
            let correct       = count_correct(out.output.inner(), out.targets.inner());

            // Backward pass + optimizer update
            let grads = out.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model     = optim.step(cfg.lr, model, grads);

            running.update(loss_val, correct, batch_size);
            if running.batches % LOG_EVERY == 0 {
                tracing::debug!(
                    "epoch {} batch {}: loss={:.4} accuracy={:.2}%",
                    epoch, running.batches, running.average_loss(), running.accuracy()
                );
            }
        }

        let metrics = running.to_epoch(epoch);
        sink.record(&metrics)?;
        if metrics.is_improvement(best) {
            best = metrics.loss;
        }

        println!(
            "epoch {} loss: {:.3} | accuracy: {:.2}% | best loss: {:.3}",
            epoch, metrics.loss, metrics.accuracy, best
        );
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(model)
}

/// Switch a trained model to the inner backend for evaluation and inference.
pub fn into_eval<B: AutodiffBackend>(model: Vgg<B>) -> Vgg<B::InnerBackend> {
    model.valid()
}
