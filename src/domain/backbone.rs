// ============================================================
// Layer 3 — Backbone Configuration Array
// ============================================================
// The convolutional backbone is described by an ordered list of
// layer markers instead of hand-written fields:
//
//   Conv(n) → 3x3 convolution to n channels (+ batch-norm + ReLU)
//   Pool    → 2x2 max-pool with stride 2 (halves the spatial side)
//
// VGG16 is five stages of 2, 2, 3, 3, 3 convolutions, each closed
// by a pool. On a 32x32 input the last stage leaves a 1x1x512 map,
// so the classifier head sees exactly 512 features.
//
// Only arithmetic lives here. Building the actual Burn layers is
// done in ml::model from the same array.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One entry of the backbone configuration array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackboneLayer {
    /// 3x3 convolution (padding 1) producing this many channels
    Conv(usize),
    /// 2x2 max-pool, stride 2
    Pool,
}

use BackboneLayer::{Conv, Pool};

/// `64 64 M 128 128 M 256 256 256 M 512 512 512 M 512 512 512 M`
pub const VGG16: &[BackboneLayer] = &[
    Conv(64), Conv(64), Pool,
    Conv(128), Conv(128), Pool,
    Conv(256), Conv(256), Conv(256), Pool,
    Conv(512), Conv(512), Conv(512), Pool,
    Conv(512), Conv(512), Conv(512), Pool,
];

/// Channel widths of every convolution, in order.
pub fn conv_widths(layers: &[BackboneLayer]) -> impl Iterator<Item = usize> + '_ {
    layers.iter().filter_map(|l| match l {
        Conv(c) => Some(*c),
        Pool    => None,
    })
}

pub fn pool_count(layers: &[BackboneLayer]) -> usize {
    layers.iter().filter(|l| matches!(l, Pool)).count()
}

/// Channels leaving the backbone. With no convolution the input passes through.
pub fn output_channels(layers: &[BackboneLayer], in_channels: usize) -> usize {
    conv_widths(layers).last().unwrap_or(in_channels)
}

/// Spatial side after every pool has been applied (each one floors the half).
pub fn feature_side(layers: &[BackboneLayer], input_side: usize) -> usize {
    (0..pool_count(layers)).fold(input_side, |side, _| side / 2)
}

/// Number of values the classifier head receives per image.
pub fn flattened_features(layers: &[BackboneLayer], in_channels: usize, input_side: usize) -> usize {
    let side = feature_side(layers, input_side);
    output_channels(layers, in_channels) * side * side
}

/// Reject arrays the model builder cannot turn into a network.
pub fn validate(layers: &[BackboneLayer], input_side: usize) -> Result<()> {
    if conv_widths(layers).next().is_none() {
        bail!("backbone needs at least one convolution");
    }
    if let Some(zero) = conv_widths(layers).position(|c| c == 0) {
        bail!("convolution #{} has zero output channels", zero + 1);
    }
    if feature_side(layers, input_side) == 0 {
        bail!(
            "{} pooling layers reduce a {}x{} input to nothing",
            pool_count(layers), input_side, input_side
        );
    }
    Ok(())
}
