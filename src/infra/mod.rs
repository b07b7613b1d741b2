// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the other
// layers:
//
//   checkpoint.rs — model weights (CompactRecorder) plus the
//                   model/train configs as JSON
//   metrics.rs    — per-epoch metrics CSV, written during
//                   training and read back for charts
//   render.rs     — PNG output: sample grids, line and bar
//                   charts, side-by-side composition

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV sink
pub mod metrics;

/// Image and chart rendering to PNG
pub mod render;
