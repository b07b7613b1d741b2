// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{bail, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::activation::softmax};

use crate::data::batcher::{CifarBatch, CifarBatcher};
use crate::data::dataset::CifarItem;
use crate::domain::labels::class_name;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::Vgg;

/// Class probabilities for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub label:         usize,
}

impl Prediction {
    fn from_probabilities(probabilities: Vec<f32>) -> Self {
        let label = probabilities
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
            .0;
        Self { probabilities, label }
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities.get(self.label).copied().unwrap_or(0.0)
    }

    pub fn class_name(&self) -> &'static str {
        class_name(self.label).unwrap_or("unknown")
    }
}

pub struct Inferencer<B: Backend> {
    model:   Vgg<B>,
    batcher: CifarBatcher,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Vgg<B>, device: B::Device) -> Self {
        Self { model, batcher: CifarBatcher::new(), device }
    }

    pub fn from_checkpoint(ckpt: &CheckpointManager, device: &B::Device) -> Result<Self> {
        let model = ckpt.load_model::<B>(device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self::new(model, device.clone()))
    }

    /// Softmax over the class logits of one image.
    pub fn predict(&self, item: &CifarItem) -> Result<Prediction> {
        let batch: CifarBatch<B> = self.batcher.batch(vec![item.clone()], &self.device);
        let logits = self.model.forward(batch.images);
        let probs  = softmax(logits, 1);

        let probabilities: Vec<f32> = probs
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;
        if probabilities.is_empty() {
            bail!("Model produced no class scores");
        }

        let prediction = Prediction::from_probabilities(probabilities);
        tracing::debug!(
            "Predicted '{}' with p={:.4}",
            prediction.class_name(), prediction.confidence()
        );
        Ok(prediction)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::IMAGE_BYTES;
    use crate::domain::backbone::BackboneLayer::{Conv, Pool};
    use crate::domain::labels::NUM_CLASSES;
    use crate::ml::model::VggConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_probabilities_form_a_distribution() {
        let device = Default::default();
        let model  = VggConfig::new(vec![Conv(2), Pool, Pool, Pool, Pool, Pool])
            .with_hidden(8)
            .init::<TestBackend>(&device);
        let inferencer = Inferencer::new(model, device);

        let item = CifarItem { image: vec![128; IMAGE_BYTES], label: 3 };
        let p    = inferencer.predict(&item).unwrap();

        assert_eq!(p.probabilities.len(), NUM_CLASSES);
        let sum: f32 = p.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "sum = {sum}");
        assert!(p.probabilities.iter().all(|&x| (0.0..=1.0).contains(&x)));
        assert!(p.label < NUM_CLASSES);
    }

    #[test]
    fn test_label_is_the_most_probable_class() {
        let p = Prediction::from_probabilities(vec![0.1, 0.05, 0.6, 0.25]);
        assert_eq!(p.label, 2);
        assert_eq!(p.class_name(), "bird");
        assert!((p.confidence() - 0.6).abs() < 1e-6);
    }
}
