// ============================================================
// Layer 4 — CIFAR-10 Dataset
// ============================================================
// Decodes the fixed-size binary records and exposes them through
// Burn's Dataset trait so the DataLoader can call get()/len().
//
// Record layout (3073 bytes):
//   [0]          label, 0..=9
//   [1..1025]    red   channel, 32x32 row-major
//   [1025..2049] green channel
//   [2049..3073] blue  channel
//
// The pixels are already channel-major, so an image's bytes map
// straight onto a [3, 32, 32] tensor without any reordering.

use anyhow::{bail, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::loader::{CifarLoader, CifarSplit};
use crate::domain::labels::NUM_CLASSES;
use crate::domain::traits::SampleSource;

pub const CHANNELS:     usize = 3;
pub const IMAGE_SIDE:   usize = 32;
pub const IMAGE_BYTES:  usize = CHANNELS * IMAGE_SIDE * IMAGE_SIDE;
pub const RECORD_BYTES: usize = 1 + IMAGE_BYTES;

/// One labelled image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CifarItem {
    /// Channel-major pixel bytes, length IMAGE_BYTES
    pub image: Vec<u8>,
    /// Class index, 0..NUM_CLASSES
    pub label: u8,
}

/// Split a buffer of concatenated records into items.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<CifarItem>> {
    if bytes.len() % RECORD_BYTES != 0 {
        bail!(
            "CIFAR-10 data is {} bytes, not a multiple of the {}-byte record size",
            bytes.len(),
            RECORD_BYTES
        );
    }

    bytes
        .chunks_exact(RECORD_BYTES)
        .enumerate()
        .map(|(i, record)| {
            let label = record[0];
            if label as usize >= NUM_CLASSES {
                bail!("record {i} has label {label}, expected 0..{NUM_CLASSES}");
            }
            Ok(CifarItem { image: record[1..].to_vec(), label })
        })
        .collect()
}

pub struct CifarDataset {
    items: Vec<CifarItem>,
}

impl CifarDataset {
    pub fn new(items: Vec<CifarItem>) -> Self {
        Self { items }
    }

    /// Load a split from `root`, downloading the archive first if it is absent.
    pub fn load(root: impl AsRef<Path>, split: CifarSplit) -> Result<Self> {
        let loader = CifarLoader::new(root.as_ref());
        loader.ensure()?;
        let items = decode_records(&loader.read_split(split)?)?;
        tracing::info!("Loaded {} {} images", items.len(), split);
        Ok(Self::new(items))
    }

    pub fn train(root: impl AsRef<Path>) -> Result<Self> {
        Self::load(root, CifarSplit::Train)
    }

    pub fn test(root: impl AsRef<Path>) -> Result<Self> {
        Self::load(root, CifarSplit::Test)
    }

    /// Number of images per class
    pub fn class_histogram(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0usize; NUM_CLASSES];
        for item in &self.items {
            counts[item.label as usize] += 1;
        }
        counts
    }
}

impl Dataset<CifarItem> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl SampleSource for CifarDataset {
    fn sample(&self, index: usize) -> Option<(Vec<u8>, usize)> {
        self.items
            .get(index)
            .map(|item| (item.image.clone(), item.label as usize))
    }

    fn sample_count(&self) -> usize {
        self.items.len()
    }
}

// ─── Test Fixtures ────────────────────────────────────────────────────────────
/// Lay out a CIFAR-10 directory under `root`: empty training batches and a
/// test batch holding `test_items`, so `ensure()` never reaches the network.
#[cfg(test)]
pub(crate) fn write_fake_cifar(root: &Path, test_items: &[CifarItem]) {
    let loader = CifarLoader::new(root);
    let dir    = loader.batches_dir();
    std::fs::create_dir_all(&dir).unwrap();

    for name in CifarSplit::Train.files() {
        std::fs::write(dir.join(name), []).unwrap();
    }
    let records: Vec<u8> = test_items
        .iter()
        .flat_map(|item| std::iter::once(item.label).chain(item.image.iter().copied()))
        .collect();
    std::fs::write(dir.join(CifarSplit::Test.files()[0]), records).unwrap();
    assert!(loader.is_complete());
}
