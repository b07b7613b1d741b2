// ============================================================
// Layer 5 — Model Summary
// ============================================================
// Layer-by-layer table in the familiar "summary" layout:
//
//   Layer (type)        Output Shape          Param #
//   Conv2d-1            [-1, 64, 32, 32]      1,792
//   BatchNorm2d-2       [-1, 64, 32, 32]      128
//   ...
//
// Computed from the VggConfig alone, so printing it never
// allocates the 33M parameters of the real network.

use std::fmt;

use crate::domain::backbone::BackboneLayer;
use crate::ml::model::VggConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name:         String,
    /// Per-sample output shape (batch dimension omitted)
    pub output_shape: Vec<usize>,
    pub params:       usize,
}

#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub input_shape: [usize; 3],
    pub layers:      Vec<LayerSummary>,
}

impl ModelSummary {
    pub fn from_config(cfg: &VggConfig) -> Self {
        let mut rows: Vec<LayerSummary> = Vec::new();
        let mut push = |kind: &str, output_shape: Vec<usize>, params: usize| {
            let name = format!("{}-{}", kind, rows.len() + 1);
            rows.push(LayerSummary { name, output_shape, params });
        };

        let mut channels = cfg.in_channels;
        let mut side     = cfg.image_side;

        for layer in &cfg.layers {
            match *layer {
                BackboneLayer::Conv(out) => {
                    // 3x3 kernel + bias, then gamma/beta
                    push("Conv2d", vec![out, side, side], channels * out * 9 + out);
                    push("BatchNorm2d", vec![out, side, side], 2 * out);
                    push("ReLU", vec![out, side, side], 0);
                    channels = out;
                }
                BackboneLayer::Pool => {
                    side /= 2;
                    push("MaxPool2d", vec![channels, side, side], 0);
                }
            }
        }

        let flat = channels * side * side;
        push("Linear", vec![cfg.hidden], flat * cfg.hidden + cfg.hidden);
        push("ReLU", vec![cfg.hidden], 0);
        push("Dropout", vec![cfg.hidden], 0);
        push("Linear", vec![cfg.hidden], cfg.hidden * cfg.hidden + cfg.hidden);
        push("ReLU", vec![cfg.hidden], 0);
        push("Dropout", vec![cfg.hidden], 0);
        push("Linear", vec![cfg.num_classes], cfg.hidden * cfg.num_classes + cfg.num_classes);

        Self {
            input_shape: [cfg.in_channels, cfg.image_side, cfg.image_side],
            layers:      rows,
        }
    }

    pub fn total_params(&self) -> usize {
        self.layers.iter().map(|l| l.params).sum()
    }

    /// f32 parameter storage in MiB
    pub fn params_size_mb(&self) -> f64 {
        (self.total_params() * 4) as f64 / (1024.0 * 1024.0)
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn shape_str(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("[-1, {}]", dims.join(", "))
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(64);
        writeln!(f, "{rule}")?;
        writeln!(f, "{:>20}  {:>25} {:>15}", "Layer (type)", "Output Shape", "Param #")?;
        writeln!(f, "{}", "=".repeat(64))?;
        for layer in &self.layers {
            writeln!(
                f,
                "{:>20}  {:>25} {:>15}",
                layer.name,
                shape_str(&layer.output_shape),
                group_thousands(layer.params)
            )?;
        }
        writeln!(f, "{}", "=".repeat(64))?;
        writeln!(f, "Input shape: {:?}", self.input_shape)?;
        writeln!(f, "Total params: {}", group_thousands(self.total_params()))?;
        writeln!(f, "Trainable params: {}", group_thousands(self.total_params()))?;
        writeln!(f, "Params size (MB): {:.2}", self.params_size_mb())?;
        write!(f, "{rule}")
    }
}
