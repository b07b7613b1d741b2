// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Report device and hyperparameters
//   Step 2: Print the model summary             (Layer 5 - ml)
//   Step 3: Load train/test splits              (Layer 4 - data)
//   Step 4: Save configs                        (Layer 6 - infra)
//   Step 5: Run the training loop               (Layer 5 - ml)
//   Step 6: Save the trained weights            (Layer 6 - infra)
//   Step 7: Evaluate on the test split          (Layer 5 - ml)
//   Step 8: Render the loss/accuracy charts     (Layer 6 - infra)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::application::inspect_use_case::{parameters_report, InspectUseCase};
use crate::data::dataset::CifarDataset;
use crate::infra::{checkpoint::CheckpointManager, metrics::CsvMetricsSink};
use crate::ml::{
    default_device,
    evaluator::{eval_loader, evaluate},
    model::VggConfig,
    summary::ModelSummary,
    trainer::{into_eval, run_training},
    InferBackend, TrainBackend,
};

// ─── OptimizerKind ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Adam,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sgd  => write!(f, "SGD"),
            Self::Adam => write!(f, "Adam"),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd"  => Ok(Self::Sgd),
            "adam" => Ok(Self::Adam),
            other  => Err(format!("unknown optimizer '{other}', expected 'sgd' or 'adam'")),
        }
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Saved next to the
// checkpoint as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub checkpoint_dir:  String,
    pub chart_dir:       String,
    pub batch_size:      usize,
    pub test_batch_size: usize,
    pub epochs:          usize,
    pub lr:              f64,
    pub optimizer:       OptimizerKind,
    pub dropout:         f64,
    pub num_workers:     usize,
    pub seed:            u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "cifar10".to_string(),
            checkpoint_dir:  "model".to_string(),
            chart_dir:       "chart".to_string(),
            batch_size:      64,
            test_batch_size: 32,
            epochs:          50,
            lr:              1e-2,
            optimizer:       OptimizerKind::Sgd,
            dropout:         0.5,
            num_workers:     2,
            seed:            42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.test_batch_size == 0 {
            bail!("batch sizes must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if !(self.lr > 0.0 && self.lr.is_finite()) {
            bail!("learning rate must be a positive number, got {}", self.lr);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        Ok(())
    }

    pub fn model_config(&self) -> VggConfig {
        VggConfig::vgg16().with_dropout(self.dropout)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train, checkpoint, evaluate. Returns test accuracy in percent.
    pub fn execute(&self) -> Result<f64> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Device and hyperparameters ───────────────────────────────
        let device = default_device();
        println!("device : {:?}", device);
        println!("{}", parameters_report(cfg));

        // ── Step 2: Model summary ────────────────────────────────────────────
        let model_cfg = cfg.model_config();
        model_cfg.validate()?;
        println!("{}", ModelSummary::from_config(&model_cfg));

        // ── Step 3: Datasets (downloaded on first use) ───────────────────────
        let train_dataset = CifarDataset::train(&cfg.data_dir)?;
        let test_dataset  = CifarDataset::test(&cfg.data_dir)?;
        tracing::debug!("Training images per class: {:?}", train_dataset.class_histogram());

        // ── Step 4: Configs, so test/infer can rebuild the model ─────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.save_config(cfg)?;
        ckpt.save_model_config(&model_cfg)?;

        // ── Step 5: Training loop ────────────────────────────────────────────
        let mut sink = CsvMetricsSink::create(&cfg.chart_dir)?;
        let model    = run_training::<TrainBackend, _>(
            cfg, &model_cfg, train_dataset, &mut sink, &device,
        )?;
        println!("Finished Training");
        println!("Metrics written to {}", sink.csv_path().display());

        // ── Step 6: Weights ──────────────────────────────────────────────────
        let model = into_eval(model);
        ckpt.save_model(&model)?;

        // ── Step 7: Test split ───────────────────────────────────────────────
        let loader = eval_loader::<InferBackend>(
            test_dataset, cfg.test_batch_size, cfg.num_workers, &device,
        );
        let report = evaluate(&model, loader);
        println!("Accuracy of the network : {:.0} %", report.accuracy().floor());

        // ── Step 8: Charts ───────────────────────────────────────────────────
        InspectUseCase::new(&cfg.data_dir, &cfg.checkpoint_dir, &cfg.chart_dir).show_charts()?;

        Ok(report.accuracy())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.test_batch_size, 32);
        assert_eq!(cfg.epochs, 50);
        assert_eq!(cfg.lr, 1e-2);
        assert_eq!(cfg.optimizer, OptimizerKind::Sgd);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(TrainConfig { batch_size: 0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { epochs: 0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { lr: 0.0, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { lr: f64::NAN, ..TrainConfig::default() }.validate().is_err());
        assert!(TrainConfig { dropout: 1.0, ..TrainConfig::default() }.validate().is_err());
    }

    #[test]
    fn test_optimizer_names() {
        assert_eq!("SGD".parse::<OptimizerKind>().unwrap(), OptimizerKind::Sgd);
        assert_eq!("adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert!("rmsprop".parse::<OptimizerKind>().is_err());
        assert_eq!(OptimizerKind::Sgd.to_string(), "SGD");
    }

    #[test]
    fn test_model_config_carries_dropout() {
        let cfg = TrainConfig { dropout: 0.3, ..TrainConfig::default() };
        let m   = cfg.model_config();
        assert_eq!(m.dropout, 0.3);
        assert_eq!(m.num_classes, 10);
    }

    #[test]
    fn test_config_json_round_trip() {
        let cfg  = TrainConfig { optimizer: OptimizerKind::Adam, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.optimizer, OptimizerKind::Adam);
        assert_eq!(back.chart_dir, "chart");
    }
}
