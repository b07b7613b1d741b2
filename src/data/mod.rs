// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the CIFAR-10 archive on the internet to tensor
// batches on the training device:
//
//   cifar-10-binary.tar.gz
//       │
//       ▼
//   CifarLoader     → downloads/unpacks, reads raw batch files
//       │
//       ▼
//   CifarDataset    → decodes 3073-byte records, Burn Dataset
//       │
//       ▼
//   CifarBatcher    → stacks items into [N,3,32,32] tensors
//       │
//       ▼
//   DataLoader      → shuffles and feeds batches to the loop

/// Downloads and reads the CIFAR-10 binary batch files
pub mod loader;

/// Record decoding and Burn's Dataset trait
pub mod dataset;

/// Burn's Batcher trait for image tensors
pub mod batcher;
