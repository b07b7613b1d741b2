// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Classify one test image with the saved checkpoint:
//
//   Step 1: Pick test sample `index`        (Layer 4 - data)
//   Step 2: Load the checkpoint             (Layer 6 - infra)
//   Step 3: Softmax over the ten classes    (Layer 5 - ml)
//   Step 4: Write image + probability bars  (Layer 6 - infra)

use anyhow::{bail, Result};
use burn::prelude::Backend;
use std::path::{Path, PathBuf};

use crate::data::dataset::{CifarDataset, CifarItem, IMAGE_SIDE};
use crate::domain::labels::class_name;
use crate::domain::traits::SampleSource;
use crate::infra::{checkpoint::CheckpointManager, render};
use crate::ml::{
    default_device,
    inferencer::{Inferencer, Prediction},
    InferBackend,
};

pub const INFERENCE_FILE: &str = "inference.png";

const IMAGE_SCALE: u32 = 8;
const CHART_WIDTH: u32 = 360;

pub struct InferUseCase {
    data_dir:       String,
    checkpoint_dir: String,
    chart_dir:      String,
}

impl InferUseCase {
    pub fn new(data_dir: String, checkpoint_dir: String, chart_dir: String) -> Self {
        Self { data_dir, checkpoint_dir, chart_dir }
    }

    pub fn execute(&self, index: usize) -> Result<Prediction> {
        let device = default_device();
        println!("device : {:?}", device);
        self.execute_on::<InferBackend>(index, &device)
    }

    pub fn execute_on<B: Backend>(&self, index: usize, device: &B::Device) -> Result<Prediction> {
        let dataset = CifarDataset::test(&self.data_dir)?;
        let item    = pick_sample(&dataset, index)?;

        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        if !ckpt.has_checkpoint() {
            bail!("No checkpoint in '{}'. Run 'train' first.", ckpt.dir().display());
        }
        let inferencer = Inferencer::<B>::from_checkpoint(&ckpt, device)?;
        let prediction = inferencer.predict(&item)?;

        println!("The ratio : {:?}", prediction.probabilities);
        println!(
            "Predicted : {} ({:.1} %) | actual : {}",
            prediction.class_name(),
            100.0 * prediction.confidence(),
            class_name(item.label as usize).unwrap_or("unknown"),
        );

        render_prediction(&item, &prediction, Path::new(&self.chart_dir).join(INFERENCE_FILE))?;
        Ok(prediction)
    }
}

/// Fetch `index` from the source, rejecting out-of-range indices.
pub fn pick_sample<S: SampleSource>(source: &S, index: usize) -> Result<CifarItem> {
    let count = source.sample_count();
    let Some((image, label)) = source.sample(index) else {
        bail!("Image index {index} is out of range: the test set has {count} images (0..{count})");
    };
    Ok(CifarItem { image, label: label as u8 })
}

/// Upscaled test image on the left, class-probability bars on the right.
pub fn render_prediction(item: &CifarItem, prediction: &Prediction, path: PathBuf) -> Result<PathBuf> {
    let image = render::upscale(&render::item_image(&item.image, IMAGE_SIDE as u32), IMAGE_SCALE);
    let bars  = render::bar_chart(&prediction.probabilities, CHART_WIDTH, image.height(), render::BAR);

    render::save_png(&render::side_by_side(&[image, bars], 16), &path)?;
    Ok(path)
}
