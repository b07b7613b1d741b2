// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// command end to end.
//
// Rules for this layer:
//   - No tensor math or model code here (Layer 5)
//   - No argument parsing here (Layer 1)
//   - File access only through Layer 4 and Layer 6
//   - Only workflow coordination

// Train, checkpoint, evaluate, chart
pub mod train_use_case;

// Score a saved checkpoint on the test split
pub mod test_use_case;

// Classify one test image
pub mod infer_use_case;

// Sample grid, hyperparameters, model summary, charts
pub mod inspect_use_case;
