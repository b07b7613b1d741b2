// ============================================================
// Layer 2 — TestUseCase
// ============================================================
// Reload the saved checkpoint and score it on the test split.

use anyhow::{bail, Result};
use burn::prelude::Backend;

use crate::data::dataset::CifarDataset;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    default_device,
    evaluator::{eval_loader, evaluate, EvalReport},
    InferBackend,
};

pub struct TestUseCase {
    data_dir:       String,
    checkpoint_dir: String,
    batch_size:     usize,
    num_workers:    usize,
}

impl TestUseCase {
    pub fn new(data_dir: String, checkpoint_dir: String, batch_size: usize, num_workers: usize) -> Self {
        Self { data_dir, checkpoint_dir, batch_size, num_workers }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let device = default_device();
        println!("device : {:?}", device);
        self.execute_on::<InferBackend>(&device)
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<EvalReport> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }

        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        if !ckpt.has_checkpoint() {
            bail!("No checkpoint in '{}'. Run 'train' first.", ckpt.dir().display());
        }
        if let Ok(run) = ckpt.load_config() {
            tracing::info!(
                "Checkpoint trained for {} epochs with {} at lr={}",
                run.epochs, run.optimizer, run.lr
            );
        }
        let model = ckpt.load_model::<B>(device)?;

        let dataset = CifarDataset::test(&self.data_dir)?;
        let loader  = eval_loader::<B>(dataset, self.batch_size, self.num_workers, device);
        let report  = evaluate(&model, loader);

        println!(
            "Accuracy of the network on the {} test images : {:.0} % (loss {:.3})",
            report.total, report.accuracy().floor(), report.average_loss()
        );
        Ok(report)
    }
}
