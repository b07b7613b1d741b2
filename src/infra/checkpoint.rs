// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained network using Burn's
// CompactRecorder (named MessagePack, half precision).
//
// What gets saved at the end of training:
//   1. vgg16.mpk          — all learned parameters and batch-norm
//                           running statistics
//   2. model_config.json  — VggConfig, to rebuild the exact
//                           architecture before loading weights
//   3. train_config.json  — hyperparameters of the run
//
// File layout (fixed, relative to the working directory):
//   model/
//     vgg16.mpk
//     model_config.json
//     train_config.json

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{Vgg, VggConfig};

const WEIGHTS_NAME:      &str = "vgg16";
const WEIGHTS_FILE:      &str = "vgg16.mpk";
const MODEL_CONFIG_FILE: &str = "model_config.json";
const TRAIN_CONFIG_FILE: &str = "train_config.json";

/// Manages saving and loading of the model checkpoint.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Point at a checkpoint directory. Nothing is created until something is saved.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when weights and architecture are both on disk
    pub fn has_checkpoint(&self) -> bool {
        self.dir.join(WEIGHTS_FILE).is_file() && self.has_model_config()
    }

    pub fn has_model_config(&self) -> bool {
        self.dir.join(MODEL_CONFIG_FILE).is_file()
    }

    fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Cannot create checkpoint directory '{}'", self.dir.display())
        })
    }

    /// Write the model weights. Overwrites any previous checkpoint.
    pub fn save_model<B: Backend>(&self, model: &Vgg<B>) -> Result<()> {
        self.create_dir()?;
        // The recorder appends its ".mpk" extension itself
        let path = self.dir.join(WEIGHTS_NAME);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::info!("Saved model weights to '{}'", self.dir.join(WEIGHTS_FILE).display());
        Ok(())
    }

    /// Rebuild the network from model_config.json and load the saved weights into it.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<Vgg<B>> {
        let model_cfg = self.load_model_config()?;
        let model     = model_cfg.init::<B>(device);
        let path      = self.dir.join(WEIGHTS_NAME);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        tracing::info!("Loaded checkpoint from '{}'", self.dir.display());
        Ok(model.load_record(record))
    }

    pub fn save_model_config(&self, cfg: &VggConfig) -> Result<()> {
        self.write_json(MODEL_CONFIG_FILE, cfg)
    }

    pub fn load_model_config(&self) -> Result<VggConfig> {
        self.read_json(MODEL_CONFIG_FILE)
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(TRAIN_CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(TRAIN_CONFIG_FILE)
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.create_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not valid JSON for this version", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backbone::BackboneLayer::{Conv, Pool};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> VggConfig {
        VggConfig::new(vec![Conv(2), Pool, Conv(4), Pool])
            .with_image_side(8)
            .with_hidden(8)
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert!(!ckpt.has_checkpoint());
        assert!(ckpt.load_model::<TestBackend>(&Default::default()).is_err());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_saved_weights_are_restored() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path().join("model"));
        let device = Default::default();
        let cfg    = tiny_config();

        let model: Vgg<TestBackend> = cfg.init(&device);
        ckpt.save_model_config(&cfg).unwrap();
        ckpt.save_model(&model).unwrap();
        assert!(ckpt.has_checkpoint());

        let restored: Vgg<TestBackend> = ckpt.load_model(&device).unwrap();
        let input = Tensor::<TestBackend, 4>::ones([1, 3, 8, 8], &device);
        let a: Vec<f32> = model.forward(input.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = restored.forward(input).into_data().to_vec().unwrap();
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2 * (1.0 + x.abs()), "{x} != {y}");
        }
    }

    #[test]
    fn test_train_config_is_persisted() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let cfg  = TrainConfig { epochs: 3, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let back = ckpt.load_config().unwrap();
        assert_eq!(back.epochs, 3);
        assert_eq!(back.batch_size, cfg.batch_size);
    }

    #[test]
    fn test_weights_file_is_what_the_recorder_writes() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path());
        let device = Default::default();
        let model: Vgg<TestBackend> = tiny_config().init(&device);

        ckpt.save_model(&model).unwrap();
        let written: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(written, vec![WEIGHTS_FILE.to_string()]);
    }

    #[test]
    fn test_directory_is_created_only_on_save() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        let ckpt = CheckpointManager::new(&path);

        assert!(!ckpt.has_checkpoint());
        assert!(ckpt.load_model_config().is_err());
        assert!(!path.exists());

        ckpt.save_model_config(&tiny_config()).unwrap();
        assert!(path.is_dir());
        assert!(ckpt.has_model_config());
    }
}
