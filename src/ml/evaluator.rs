// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs the network over a whole split without gradients and
// reports mean loss and accuracy. Used after training and by
// the `test` command.
//
// Must be called with an inner (non-autodiff) backend model,
// i.e. `model.valid()`: dropout is then a no-op and batch-norm
// uses its running statistics.

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::sync::Arc;

use crate::data::batcher::{CifarBatch, CifarBatcher};
use crate::data::dataset::CifarDataset;
use crate::ml::model::Vgg;

pub type BatchLoader<B> = Arc<dyn DataLoader<B, CifarBatch<B>>>;

/// Sequential (unshuffled) loader over a dataset.
pub fn eval_loader<B: Backend>(
    dataset:     CifarDataset,
    batch_size:  usize,
    num_workers: usize,
    device:      &B::Device,
) -> BatchLoader<B> {
    DataLoaderBuilder::<B, _, _>::new(CifarBatcher::new())
        .batch_size(batch_size)
        .num_workers(num_workers)
        .set_device(device.clone())
        .build(dataset)
}

/// Number of rows whose highest logit matches the target class.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns [batch, 1] — flatten to [batch] before comparing
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalReport {
    pub loss_sum: f64,
    pub batches:  usize,
    pub correct:  usize,
    pub total:    usize,
}

impl EvalReport {
    pub fn average_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    /// Percentage 0..=100
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { 100.0 * self.correct as f64 / self.total as f64 } else { 0.0 }
    }
}

pub fn evaluate<B: Backend>(model: &Vgg<B>, loader: BatchLoader<B>) -> EvalReport {
    let mut report = EvalReport::default();

    for batch in loader.iter() {
        let out = model.forward_classification(batch.images, batch.targets);

        report.loss_sum += out.loss.into_scalar().elem::<f64>();
        report.batches  += 1;
        report.total    += out.targets.dims()[0];
        report.correct  += count_correct(out.output, out.targets);
    }

    tracing::debug!(
        "Evaluated {} images in {} batches: loss={:.4}, accuracy={:.2}%",
        report.total, report.batches, report.average_loss(), report.accuracy()
    );
    report
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{CifarItem, IMAGE_BYTES};
    use crate::domain::backbone::BackboneLayer::{Conv, Pool};
    use crate::ml::model::VggConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_count_correct() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(vec![1i64, 0, 0], [3])
                .convert::<<TestBackend as Backend>::IntElem>(),
            &device,
        );
        assert_eq!(count_correct(logits, targets), 2);
    }

    #[test]
    fn test_report_arithmetic() {
        let r = EvalReport { loss_sum: 3.0, batches: 2, correct: 3, total: 4 };
        assert_eq!(r.average_loss(), 1.5);
        assert_eq!(r.accuracy(), 75.0);

        let empty = EvalReport::default();
        assert!(empty.average_loss().is_nan());
        assert_eq!(empty.accuracy(), 0.0);
    }

    #[test]
    fn test_evaluate_covers_every_image() {
        let device = Default::default();
        let cfg    = VggConfig::new(vec![Conv(2), Pool, Pool, Pool, Pool, Pool]).with_hidden(8);
        let model  = cfg.init::<TestBackend>(&device);

        let items: Vec<CifarItem> = (0..5u8)
            .map(|i| CifarItem { image: vec![i * 40; IMAGE_BYTES], label: i })
            .collect();
        let loader = eval_loader::<TestBackend>(CifarDataset::new(items), 2, 1, &device);

        let report = evaluate(&model, loader);
        assert_eq!(report.total, 5);
        assert_eq!(report.batches, 3);
        assert!(report.correct <= 5);
        assert!(report.average_loss().is_finite());
    }
}
