// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// The "show" commands. Nothing here trains or runs the network;
// output is text on stdout or a PNG under the chart directory.
//
//   show_samples  → samples.png       3x3 random training images
//   show_model    → summary table of the architecture
//   show_charts   → training_rate.png + accuracy.png → charts.png
//   print_parameters → hyperparameters of a run

use anyhow::{bail, Result};
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::data::dataset::{CifarDataset, IMAGE_SIDE};
use crate::domain::labels::class_name;
use crate::domain::traits::SampleSource;
use crate::infra::{checkpoint::CheckpointManager, metrics, render};
use crate::ml::{model::VggConfig, summary::ModelSummary};

pub const SAMPLES_FILE:  &str = "samples.png";
pub const LOSS_FILE:     &str = "training_rate.png";
pub const ACCURACY_FILE: &str = "accuracy.png";
pub const CHARTS_FILE:   &str = "charts.png";

const GRID_COLS:    u32   = 3;
const GRID_SAMPLES: usize = 9;
const TILE_SCALE:   u32   = 4;
const CHART_SIZE:   (u32, u32) = (480, 320);

// ─── Hyperparameters ─────────────────────────────────────────────────────────
pub fn parameters_report(cfg: &TrainConfig) -> String {
    format!(
        "\nHyperparameter :\nBatch size : {}\nLearning rate : {:.6}\noptimizer : {}",
        cfg.batch_size, cfg.lr, cfg.optimizer
    )
}

pub fn print_parameters(cfg: &TrainConfig) {
    println!("{}", parameters_report(cfg));
}

// ─── InspectUseCase ───────────────────────────────────────────────────────────
pub struct InspectUseCase {
    data_dir:       PathBuf,
    checkpoint_dir: PathBuf,
    chart_dir:      PathBuf,
}

impl InspectUseCase {
    pub fn new(
        data_dir:       impl AsRef<Path>,
        checkpoint_dir: impl AsRef<Path>,
        chart_dir:      impl AsRef<Path>,
    ) -> Self {
        Self {
            data_dir:       data_dir.as_ref().to_path_buf(),
            checkpoint_dir: checkpoint_dir.as_ref().to_path_buf(),
            chart_dir:      chart_dir.as_ref().to_path_buf(),
        }
    }

    /// Nine random training images in a 3x3 grid; labels are printed row by row.
    pub fn show_samples(&self) -> Result<PathBuf> {
        let dataset = CifarDataset::train(&self.data_dir)?;
        let path    = self.chart_dir.join(SAMPLES_FILE);
        let labels  = write_sample_grid(&dataset, &mut rand::thread_rng(), &path)?;

        for row in labels.chunks(GRID_COLS as usize) {
            println!("{}", row.join(" "));
        }
        Ok(path)
    }

    /// Summary table of the trained architecture, or of VGG16 before any training.
    pub fn show_model(&self) -> Result<ModelSummary> {
        let ckpt      = CheckpointManager::new(&self.checkpoint_dir);
        let model_cfg = if ckpt.has_model_config() {
            ckpt.load_model_config()?
        } else {
            tracing::info!("No saved model config in '{}', showing VGG16", ckpt.dir().display());
            VggConfig::vgg16()
        };
        model_cfg.validate()?;

        let summary = ModelSummary::from_config(&model_cfg);
        println!("\n{summary}");
        Ok(summary)
    }

    /// Loss and accuracy line charts from metrics.csv.
    pub fn render_charts(&self) -> Result<(PathBuf, PathBuf)> {
        let rows = metrics::read_all(&self.chart_dir)?;
        if rows.is_empty() {
            bail!(
                "No epochs recorded in '{}'",
                self.chart_dir.join(metrics::METRICS_FILE).display()
            );
        }

        let losses:     Vec<f64> = rows.iter().map(|m| m.loss).collect();
        let accuracies: Vec<f64> = rows.iter().map(|m| m.accuracy).collect();
        let (w, h) = CHART_SIZE;

        let loss_path = self.chart_dir.join(LOSS_FILE);
        let acc_path  = self.chart_dir.join(ACCURACY_FILE);
        render::save_png(&render::line_chart(&losses, w, h, render::LOSS), &loss_path)?;
        render::save_png(&render::line_chart(&accuracies, w, h, render::ACCURACY), &acc_path)?;

        if let Some(last) = rows.last() {
            tracing::info!(
                "Charted {} epochs; last loss={:.3}, accuracy={:.2}%",
                rows.len(), last.loss, last.accuracy
            );
        }
        Ok((loss_path, acc_path))
    }

    /// Render both charts and place them side by side in charts.png.
    pub fn show_charts(&self) -> Result<PathBuf> {
        let (loss_path, acc_path) = self.render_charts()?;
        let combined = render::side_by_side(
            &[render::load_png(&loss_path)?, render::load_png(&acc_path)?],
            render::MARGIN,
        );

        let path = self.chart_dir.join(CHARTS_FILE);
        render::save_png(&combined, &path)?;
        Ok(path)
    }
}

/// Draw up to nine distinct random samples into a grid PNG; returns their class names.
pub fn write_sample_grid<S: SampleSource, R: Rng>(
    source: &S,
    rng:    &mut R,
    path:   &Path,
) -> Result<Vec<&'static str>> {
    let count = source.sample_count();
    if count == 0 {
        bail!("No images to show");
    }

    let picks = rand::seq::index::sample(rng, count, GRID_SAMPLES.min(count)).into_vec();
    let mut tiles  = Vec::with_capacity(picks.len());
    let mut labels = Vec::with_capacity(picks.len());

    for index in picks {
        if let Some((pixels, label)) = source.sample(index) {
            let tile = render::item_image(&pixels, IMAGE_SIDE as u32);
            tiles.push(render::upscale(&tile, TILE_SCALE));
            labels.push(class_name(label).unwrap_or("unknown"));
        }
    }

    render::save_png(&render::sample_grid(&tiles, GRID_COLS, 2), path)?;
    Ok(labels)
}
