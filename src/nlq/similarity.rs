//! Sequence similarity ratio.
//!
//! `2 * M / (|a| + |b|)`, where `M` is the number of characters left equal by
//! a Myers char diff of `a` into `b` (their longest common subsequence).
//! Works on chars, not bytes.

use similar::{Algorithm, DiffOp, TextDiff};

/// Similarity of `a` and `b` in `[0, 1]`. Two empty strings score `1.0`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(a, b) as f64 / total as f64
}

/// Characters of `a` kept in place when diffing it into `b`.
pub fn matched_chars(a: &str, b: &str) -> usize {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(a, b);

    diff.ops()
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum()
}
