// ============================================================
// Layer 6 — Metrics Sink
// ============================================================
// Records training metrics to a CSV file after each epoch, and
// reads them back for the loss/accuracy charts.
//
// Output file: <chart_dir>/metrics.csv
//
//   epoch,loss,accuracy
//   1,2.061532,22.734000
//   2,1.702219,35.912000
//   ...
//
// A new training run starts a fresh file; rows are appended as
// epochs finish so a crashed run still leaves its history.

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::metrics::EpochMetrics;
use crate::domain::traits::MetricsSink;

pub const METRICS_FILE: &str = "metrics.csv";
const HEADER: &str = "epoch,loss,accuracy";

/// Appends one CSV row per epoch.
pub struct CsvMetricsSink {
    csv_path: PathBuf,
}

impl CsvMetricsSink {
    /// Start a new metrics file in `dir`, replacing any previous one.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create chart directory '{}'", dir.display()))?;

        let csv_path = dir.join(METRICS_FILE);
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl MetricsSink for CsvMetricsSink {
    fn record(&mut self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.loss, m.accuracy)?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, accuracy={:.2}%",
            m.epoch, m.loss, m.accuracy,
        );
        Ok(())
    }
}

/// Parse every row of `<dir>/metrics.csv`.
pub fn read_all(dir: impl AsRef<Path>) -> Result<Vec<EpochMetrics>> {
    let path = dir.as_ref().join(METRICS_FILE);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read '{}'. Have you run 'train' first?", path.display()))?;

    let mut lines = text.lines();
    match lines.next() {
        Some(h) if h.trim() == HEADER => {}
        other => bail!("'{}' has unexpected header {:?}", path.display(), other),
    }

    lines
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_row(line).with_context(|| format!("{}:{}", path.display(), i + 2)))
        .collect()
}

fn parse_row(line: &str) -> Result<EpochMetrics> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [epoch, loss, accuracy] = fields.as_slice() else {
        bail!("expected 3 fields, found {}", fields.len());
    };
    Ok(EpochMetrics::new(epoch.parse()?, loss.parse()?, accuracy.parse()?))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_read_back_in_order() {
        let dir      = tempfile::tempdir().unwrap();
        let mut sink = CsvMetricsSink::create(dir.path()).unwrap();
        sink.record(&EpochMetrics::new(1, 2.0615, 22.7)).unwrap();
        sink.record(&EpochMetrics::new(2, 1.7022, 35.9)).unwrap();

        let rows = read_all(dir.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].epoch, 2);
        assert!((rows[0].loss - 2.0615).abs() < 1e-6);
        assert!((rows[1].accuracy - 35.9).abs() < 1e-6);
    }

    #[test]
    fn test_csv_path_points_at_the_written_file() {
        let dir  = tempfile::tempdir().unwrap();
        let sink = CsvMetricsSink::create(dir.path()).unwrap();
        assert_eq!(sink.csv_path(), dir.path().join(METRICS_FILE));
        assert!(sink.csv_path().is_file());
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvMetricsSink::create(dir.path()).unwrap();
        sink.record(&EpochMetrics::new(1, 1.0, 10.0)).unwrap();

        CsvMetricsSink::create(dir.path()).unwrap();
        assert!(read_all(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_all(dir.path()).is_err());
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(METRICS_FILE), "epoch,loss,accuracy\n1,abc,3\n").unwrap();
        assert!(read_all(dir.path()).is_err());

        fs::write(dir.path().join(METRICS_FILE), "epoch,loss,accuracy\n1,0.5\n").unwrap();
        assert!(read_all(dir.path()).is_err());
    }
}
