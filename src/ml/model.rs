use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
    train::ClassificationOutput,
};

use crate::domain::backbone::{self, BackboneLayer, VGG16};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct VggConfig {
    /// Backbone configuration array, e.g. backbone::VGG16
    pub layers: Vec<BackboneLayer>,
    #[config(default = 3)]
    pub in_channels: usize,
    #[config(default = 32)]
    pub image_side: usize,
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 4096)]
    pub hidden: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl VggConfig {
    /// VGG16 on 32x32 RGB input with ten classes
    pub fn vgg16() -> Self {
        Self::new(VGG16.to_vec())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        backbone::validate(&self.layers, self.image_side)
    }

    /// Features handed from the backbone to the classifier head
    pub fn flattened_features(&self) -> usize {
        backbone::flattened_features(&self.layers, self.in_channels, self.image_side)
    }

    /// Build the network. The configuration is expected to pass `validate`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Vgg<B> {
        let mut stages      = Vec::new();
        let mut blocks      = Vec::new();
        let mut in_channels = self.in_channels;

        // Every Pool closes a stage; convs after the last Pool form an open stage.
        for layer in &self.layers {
            match *layer {
                BackboneLayer::Conv(out_channels) => {
                    blocks.push(ConvBlock::new(in_channels, out_channels, device));
                    in_channels = out_channels;
                }
                BackboneLayer::Pool => {
                    let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
                    stages.push(Stage { blocks: std::mem::take(&mut blocks), pool: Some(pool) });
                }
            }
        }
        if !blocks.is_empty() {
            stages.push(Stage { blocks, pool: None });
        }

        let flat = self.flattened_features();
        Vgg {
            stages,
            fc1:     LinearConfig::new(flat, self.hidden).init(device),
            fc2:     LinearConfig::new(self.hidden, self.hidden).init(device),
            fc3:     LinearConfig::new(self.hidden, self.num_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// conv 3x3 (padding 1) → batch-norm → ReLU
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub norm: BatchNorm<B>,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let norm = BatchNormConfig::new(out_channels).init(device);
        Self { conv, norm }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        relu(self.norm.forward(self.conv.forward(x)))
    }
}

/// A run of conv blocks, optionally closed by a 2x2 max-pool.
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    pub blocks: Vec<ConvBlock<B>>,
    pub pool:   Option<MaxPool2d>,
}

impl<B: Backend> Stage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.blocks.iter().fold(x, |x, block| block.forward(x));
        match &self.pool {
            Some(pool) => pool.forward(x),
            None       => x,
        }
    }
}

#[derive(Module, Debug)]
pub struct Vgg<B: Backend> {
    pub stages:  Vec<Stage<B>>,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
    pub fc3:     Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> Vgg<B> {
    /// images: [batch, channels, side, side] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.stages.iter().fold(images, |x, stage| stage.forward(x));
        let x: Tensor<B, 2> = x.flatten(1, 3);

        let x = self.dropout.forward(relu(self.fc1.forward(x)));
        let x = self.dropout.forward(relu(self.fc2.forward(x)));
        self.fc3.forward(x)
    }

    /// Forward pass plus cross-entropy against the targets.
    pub fn forward_classification(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss   = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());
        ClassificationOutput::new(loss, output, targets)
    }
}
