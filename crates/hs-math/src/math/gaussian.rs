//! Diagonal-covariance Gaussian densities for HMM emissions.

use serde::{Deserialize, Serialize};

/// log(2π), used by every density evaluation.
pub const LOG_2PI: f64 = 1.837_877_066_409_345_5;

/// Log density of `x` under N(mean, diag(var)).
///
/// The caller guarantees that the three slices share one length and that
/// every variance is strictly positive.
pub fn diag_log_pdf(x: &[f64], mean: &[f64], var: &[f64]) -> f64 {
    let mut log_prob = 0.0;
    for ((xi, mi), vi) in x.iter().zip(mean).zip(var) {
        let diff = xi - mi;
        log_prob += -0.5 * (diff * diff / vi + vi.ln() + LOG_2PI);
    }
    log_prob
}

/// Gaussian with independent per-feature variances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagGaussian {
    /// Per-feature mean.
    pub mean: Vec<f64>,
    /// Per-feature variance (strictly positive).
    pub var: Vec<f64>,
}

impl DiagGaussian {
    pub fn new(mean: Vec<f64>, var: Vec<f64>) -> Self {
        Self { mean, var }
    }

    /// Maximum-likelihood fit over `frames`, with `min_var` added to every
    /// variance so that constant features stay evaluable.
    ///
    /// Returns None when `frames` is empty.
    pub fn from_frames(frames: &[Vec<f64>], min_var: f64) -> Option<Self> {
        let first = frames.first()?;
        let d = first.len();
        let n = frames.len() as f64;

        let mut mean = vec![0.0; d];
        for frame in frames {
            for (m, x) in mean.iter_mut().zip(frame) {
                *m += x;
            }
        }
        for m in mean.iter_mut() {
            *m /= n;
        }

        let mut var = vec![0.0; d];
        for frame in frames {
            for ((v, x), m) in var.iter_mut().zip(frame).zip(&mean) {
                let diff = x - m;
                *v += diff * diff;
            }
        }
        for v in var.iter_mut() {
            *v = *v / n + min_var;
        }

        Some(Self { mean, var })
    }

    /// Dimension of the distribution.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Log density at `x`.
    pub fn log_pdf(&self, x: &[f64]) -> f64 {
        diag_log_pdf(x, &self.mean, &self.var)
    }

    /// True when every parameter is finite and every variance is positive.
    pub fn is_well_formed(&self) -> bool {
        self.mean.len() == self.var.len()
            && self.mean.iter().all(|m| m.is_finite())
            && self.var.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn std_normal_log_pdf(x: f64) -> f64 {
        -0.5 * (x * x + (2.0 * PI).ln())
    }

    #[test]
    fn unit_variance_matches_standard_normal() {
        let g = DiagGaussian::new(vec![0.0], vec![1.0]);
        for x in [-2.0, -0.5, 0.0, 1.3] {
            assert!((g.log_pdf(&[x]) - std_normal_log_pdf(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn independent_features_add_in_log_space() {
        let g = DiagGaussian::new(vec![1.0, -2.0], vec![0.5, 2.0]);
        let a = DiagGaussian::new(vec![1.0], vec![0.5]);
        let b = DiagGaussian::new(vec![-2.0], vec![2.0]);
        let joint = g.log_pdf(&[0.3, -1.0]);
        let split = a.log_pdf(&[0.3]) + b.log_pdf(&[-1.0]);
        assert!((joint - split).abs() < 1e-12);
    }

    #[test]
    fn density_peaks_at_mean() {
        let g = DiagGaussian::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        assert!(g.log_pdf(&[0.0, 0.0]) > g.log_pdf(&[1.0, 1.0]));
    }

    #[test]
    fn from_frames_recovers_moments() {
        let frames = vec![vec![1.0, 2.0], vec![3.0, 2.0]];
        let g = DiagGaussian::from_frames(&frames, 1e-3).unwrap();
        assert_eq!(g.mean, vec![2.0, 2.0]);
        assert!((g.var[0] - 1.001).abs() < 1e-12);
        // Constant feature still gets the floor.
        assert!((g.var[1] - 1e-3).abs() < 1e-12);
        assert!(g.is_well_formed());
    }

    #[test]
    fn from_frames_empty_is_none() {
        assert!(DiagGaussian::from_frames(&[], 1e-3).is_none());
    }
}
