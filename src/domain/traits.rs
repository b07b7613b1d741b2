// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop only knows it has somewhere to send epoch
// metrics. The CSV file in infra::metrics is one implementation;
// tests use an in-memory Vec.

use anyhow::Result;

use crate::domain::metrics::EpochMetrics;

// ─── MetricsSink ──────────────────────────────────────────────────────────────
/// Any component that accepts per-epoch training metrics.
///
/// Implementations:
///   - CsvMetricsSink        → appends rows to metrics.csv
///   - Vec<EpochMetrics>     → keeps them in memory
pub trait MetricsSink {
    /// Record one epoch. Called once per epoch, in order.
    fn record(&mut self, metrics: &EpochMetrics) -> Result<()>;
}

impl MetricsSink for Vec<EpochMetrics> {
    fn record(&mut self, metrics: &EpochMetrics) -> Result<()> {
        self.push(*metrics);
        Ok(())
    }
}

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Indexed access to labelled images, independent of Burn's Dataset trait.
/// Used by the visualisation and inference paths.
pub trait SampleSource {
    /// Channel-major pixels (3 × side × side) and the class label
    fn sample(&self, index: usize) -> Option<(Vec<u8>, usize)>;

    fn sample_count(&self) -> usize;
}
