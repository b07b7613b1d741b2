// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds, trains or runs the network.
//
//   model.rs      — VGG-style backbone (conv → batch-norm → relu,
//                   max-pool between stages) and a 3-layer
//                   classifier head with dropout
//
//   summary.rs    — Per-layer output shapes and parameter counts,
//                   derived from the config without a forward pass
//
//   trainer.rs    — Epoch loop: forward, cross-entropy, backward,
//                   optimiser step, per-epoch metrics
//
//   evaluator.rs  — Loss and accuracy over a whole split
//
//   inferencer.rs — Loads a checkpoint and returns class
//                   probabilities for one image
//
// Backend selection:
//   default build  → Wgpu (GPU when available)
//   --no-default-features → NdArray on the CPU

use burn::backend::Autodiff;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = Autodiff<InferBackend>;

pub fn default_device() -> <InferBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

/// VGG network definition
pub mod model;

/// Architecture summary table
pub mod summary;

/// Training loop
pub mod trainer;

/// Test-set evaluation
pub mod evaluator;

/// Single-image prediction from a checkpoint
pub mod inferencer;
