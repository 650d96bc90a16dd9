//! Property-based tests for hs-math numerical functions.
//!
//! Uses proptest to verify the identities the HMM recursions rely on.

use hs_math::{
    diag_log_pdf, log_add_exp, log_sum_exp, log_sum_exp_pairs, mean, normalize, DiagGaussian,
};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    if a.is_nan() || b.is_nan() {
        return false;
    }
    if a.is_infinite() && b.is_infinite() {
        return a.signum() == b.signum();
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// log_sum_exp properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// log_sum_exp is commutative: order doesn't matter.
    #[test]
    fn log_sum_exp_commutative(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        let ab = log_sum_exp(&[a, b]);
        let ba = log_sum_exp(&[b, a]);
        prop_assert!(approx_eq(ab, ba, TOL), "lse([{},{}])={} != lse([{},{}])={}", a, b, ab, b, a, ba);
    }

    /// log_sum_exp is associative: grouping doesn't matter.
    #[test]
    fn log_sum_exp_associative(a in -50.0..50.0f64, b in -50.0..50.0f64, c in -50.0..50.0f64) {
        let direct = log_sum_exp(&[a, b, c]);
        let grouped = log_sum_exp(&[log_sum_exp(&[a, b]), c]);
        prop_assert!(approx_eq(direct, grouped, TOL));
    }

    /// Forward-pass magnitudes must neither overflow nor underflow.
    #[test]
    fn log_sum_exp_no_underflow(a in -700.0..-500.0f64, b in -700.0..-500.0f64) {
        let result = log_sum_exp(&[a, b]);
        prop_assert!(result.is_finite());
        prop_assert!(result >= a.max(b) - TOL);
    }

    /// The pairwise variant agrees with summing first.
    #[test]
    fn log_sum_exp_pairs_agrees(
        a in prop::collection::vec(-300.0..50.0f64, 1..8),
        shift in -20.0..20.0f64,
    ) {
        let b: Vec<f64> = a.iter().map(|x| shift - x / 3.0).collect();
        let summed: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        let direct = log_sum_exp(&summed);
        let paired = log_sum_exp_pairs(a.iter().copied().zip(b.iter().copied()));
        prop_assert!(approx_eq(direct, paired, 1e-9), "{} vs {}", direct, paired);
    }

    #[test]
    fn log_add_exp_matches_log_sum_exp(a in -100.0..100.0f64, b in -100.0..100.0f64) {
        prop_assert!(approx_eq(log_add_exp(a, b), log_sum_exp(&[a, b]), TOL));
    }
}

// ============================================================================
// Gaussian density properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The density is maximal at the mean.
    #[test]
    fn diag_density_peaks_at_mean(
        mean_v in prop::collection::vec(-10.0..10.0f64, 1..5),
        offset in 0.01..5.0f64,
        var in 0.01..10.0f64,
    ) {
        let var_v = vec![var; mean_v.len()];
        let shifted: Vec<f64> = mean_v.iter().map(|m| m + offset).collect();
        prop_assert!(diag_log_pdf(&mean_v, &mean_v, &var_v) > diag_log_pdf(&shifted, &mean_v, &var_v));
    }

    /// Fitting from frames always yields a usable density.
    #[test]
    fn fitted_gaussian_is_well_formed(
        frames in prop::collection::vec(prop::collection::vec(-100.0..100.0f64, 3), 1..20),
    ) {
        let g = DiagGaussian::from_frames(&frames, 1e-3).expect("non-empty frames");
        prop_assert!(g.is_well_formed());
        prop_assert_eq!(g.dim(), 3);
        for frame in &frames {
            prop_assert!(g.log_pdf(frame).is_finite());
        }
    }
}

// ============================================================================
// summary helpers
// ============================================================================

proptest! {
    #[test]
    fn mean_lies_between_extremes(values in prop::collection::vec(-1e6..1e6f64, 1..50)) {
        let m = mean(&values).unwrap();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(m >= lo - 1e-6 && m <= hi + 1e-6);
    }

    #[test]
    fn normalized_rows_sum_to_one(mut row in prop::collection::vec(0.001..100.0f64, 1..10)) {
        prop_assert!(normalize(&mut row));
        let sum: f64 = row.iter().sum();
        prop_assert!(approx_eq(sum, 1.0, 1e-12));
    }
}
