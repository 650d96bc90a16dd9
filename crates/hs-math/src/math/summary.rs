//! Small aggregate helpers over score vectors and probability rows.

/// Arithmetic mean, or None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Normalize a non-negative row in place so it sums to one.
///
/// Returns false (leaving the row untouched) when the sum is zero or not
/// finite.
pub fn normalize(row: &mut [f64]) -> bool {
    let sum: f64 = row.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return false;
    }
    for p in row.iter_mut() {
        *p /= sum;
    }
    true
}
