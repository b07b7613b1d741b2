// ============================================================
// Layer 3 — Epoch Metrics Record
// ============================================================
// One row of training metrics, produced at every epoch boundary.
//
//   loss:     average cross-entropy over the epoch's batches
//   accuracy: percentage (0..=100) of training images classified
//             correctly while the weights were being updated
//
// Kept free of Burn types so the metrics sink and the chart
// renderer can use it without touching the ML layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch number, starting at 1
    pub epoch: usize,

    /// Mean batch loss over the epoch
    pub loss: f64,

    /// Percentage of correct predictions, 0..=100
    pub accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64, accuracy: f64) -> Self {
        Self { epoch, loss, accuracy }
    }

    /// Returns true if this epoch's loss beats the previous best
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.loss < best_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 1.25, 54.0);
        assert!(m.is_improvement(1.5));
        assert!(!m.is_improvement(1.0));
        // equal loss is not progress
        assert!(!m.is_improvement(1.25));
    }
}
