// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the problem: which network
// topology to build, what the ten classes are called, and what
// a row of training metrics looks like.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums, constants and traits

// The backbone configuration array and its shape arithmetic
pub mod backbone;

// CIFAR-10 class names
pub mod labels;

// Per-epoch metrics record
pub mod metrics;

// Abstractions other layers implement
pub mod traits;
