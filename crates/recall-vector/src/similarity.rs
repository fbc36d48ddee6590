//! Cosine similarity between equal-length vectors.
//!
//! Accumulation happens in f64 so repeated calls on the same inputs produce
//! the same value regardless of call site.

use recall_core::error::RecallError;

/// Cosine similarity of `a` and `b`.
///
/// Returns `0.0` when either vector has zero magnitude, including zero
/// against zero. Fails with `DimensionMismatch` when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, RecallError> {
    check_dimensions(a.len(), b.len())?;
    Ok(cosine_with_norms(a, l2_norm(a), b, l2_norm(b)))
}

/// Cosine similarity with both magnitudes already known.
///
/// Callers must ensure `a.len() == b.len()`.
pub(crate) fn cosine_with_norms(a: &[f32], norm_a: f64, b: &[f32], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    // Rounding can push |cos| a hair past 1 for near-parallel vectors.
    // Adding 0.0 folds -0.0 into 0.0, which `total_cmp` would order lower.
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0) + 0.0
}

/// Dot product accumulated in f64.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}

/// Euclidean length accumulated in f64.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt()
}

pub(crate) fn check_dimensions(expected: usize, actual: usize) -> Result<(), RecallError> {
    if expected != actual {
        return Err(RecallError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
