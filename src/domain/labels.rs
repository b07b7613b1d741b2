// ============================================================
// Layer 3 — CIFAR-10 Class Labels
// ============================================================
// The dataset stores each label as a single byte 0..=9.
// These are the short display names used in logs and charts.

pub const NUM_CLASSES: usize = 10;

pub const CLASSES: [&str; NUM_CLASSES] = [
    "plane", "car", "bird", "cat", "deer",
    "dog", "frog", "horse", "ship", "truck",
];

/// Display name for a label, or None if it is out of range.
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASSES.get(label).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(class_name(0), Some("plane"));
        assert_eq!(class_name(9), Some("truck"));
    }

    #[test]
    fn test_out_of_range_label() {
        assert_eq!(class_name(NUM_CLASSES), None);
    }
}
