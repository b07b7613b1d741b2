// ============================================================
// Layer 4 — CIFAR-10 Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec<CifarItem> becomes one
// image tensor and one label tensor.
//
//   Input:  N items, each 3072 bytes + 1 label byte
//   Output: images  [N, 3, 32, 32]  float, scaled to [0, 1]
//           targets [N]             int
//
// Scaling is the only transform: bytes / 255, no mean/std shift.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::{CifarItem, CHANNELS, IMAGE_SIDE};

/// A batch of CIFAR-10 images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct CifarBatch<B: Backend> {
    /// Pixel values in [0, 1] — shape: [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Stateless: the device comes from the DataLoader on every call.
#[derive(Clone, Debug, Default)]
pub struct CifarBatcher;

impl CifarBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, CifarItem, CifarBatch<B>> for CifarBatcher {
    fn batch(&self, items: Vec<CifarItem>, device: &B::Device) -> CifarBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.image.iter().map(|&p| p as f32 / 255.0))
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|item| item.label as i64)
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, CHANNELS, IMAGE_SIDE, IMAGE_SIDE])
                .convert::<B::FloatElem>(),
            device,
        );

        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]).convert::<B::IntElem>(),
            device,
        );

        CifarBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::IMAGE_BYTES;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn item(label: u8, fill: u8) -> CifarItem {
        CifarItem { image: vec![fill; IMAGE_BYTES], label }
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batch: CifarBatch<TestBackend> =
            CifarBatcher::new().batch(vec![item(0, 0), item(5, 255), item(9, 51)], &device);

        assert_eq!(batch.images.dims(), [3, 3, 32, 32]);
        assert_eq!(batch.targets.dims(), [3]);
    }

    #[test]
    fn test_pixels_scaled_to_unit_range() {
        let device = Default::default();
        let batch: CifarBatch<TestBackend> =
            CifarBatcher::new().batch(vec![item(0, 0), item(1, 255)], &device);

        let max: f32 = batch.images.clone().max().into_scalar().elem();
        let min: f32 = batch.images.min().into_scalar().elem();
        assert!((max - 1.0).abs() < 1e-6);
        assert!(min.abs() < 1e-6);
    }

    #[test]
    fn test_targets_follow_item_order() {
        let device = Default::default();
        let batch: CifarBatch<TestBackend> =
            CifarBatcher::new().batch(vec![item(7, 0), item(2, 0), item(4, 0)], &device);

        let targets: Vec<i64> = batch
            .targets
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(targets, vec![7, 2, 4]);
    }
}
