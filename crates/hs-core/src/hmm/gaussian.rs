//! Diagonal-covariance Gaussian HMM fitted by Baum-Welch.
//!
//! Training runs EM over all sequences of an [`Xlengths`] jointly. The
//! initial emission means come from a seeded k-means pass over the frames,
//! every state starts with the global per-feature variance, and the start
//! and transition distributions start uniform. Iteration stops after
//! `n_iter` rounds or once one round improves the total log-likelihood by
//! less than `tol`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::algorithms::{forward, log_emissions, posteriors};
use super::{HmmEngine, HmmModel, ScoreError, TrainError};
use crate::corpus::{Frame, Xlengths};
use hs_config::TrainerConfig;
use hs_math::{ln_prob, normalize, DiagGaussian};

/// Lloyd iterations used to seed emission means.
const KMEANS_ITERATIONS: usize = 10;

/// States with less posterior mass than this keep their previous emission.
const MIN_POSTERIOR_MASS: f64 = 1e-10;

/// Tolerance when checking that probability rows sum to one.
const STOCHASTIC_TOL: f64 = 1e-6;

/// Trained Gaussian HMM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianHmm {
    /// Initial state distribution.
    pub start_prob: Vec<f64>,
    /// Row-stochastic transition matrix, `[from][to]`.
    pub transmat: Vec<Vec<f64>>,
    /// Per-state emission densities.
    pub emissions: Vec<DiagGaussian>,
}

impl GaussianHmm {
    /// True when every distribution is well formed and all dimensions agree.
    pub fn is_well_formed(&self) -> bool {
        let n = self.start_prob.len();
        if n == 0 || self.transmat.len() != n || self.emissions.len() != n {
            return false;
        }
        let dim = self.emissions[0].dim();
        let stochastic = |row: &[f64]| {
            row.len() == n
                && row.iter().all(|p| p.is_finite() && *p >= 0.0)
                && (row.iter().sum::<f64>() - 1.0).abs() < STOCHASTIC_TOL
        };
        stochastic(self.start_prob.as_slice())
            && self.transmat.iter().all(|row| stochastic(row.as_slice()))
            && self
                .emissions
                .iter()
                .all(|g| g.dim() == dim && g.is_well_formed())
    }

    fn log_start(&self) -> Vec<f64> {
        self.start_prob.iter().map(|p| ln_prob(*p)).collect()
    }

    fn log_transmat(&self) -> Vec<Vec<f64>> {
        self.transmat
            .iter()
            .map(|row| row.iter().map(|p| ln_prob(*p)).collect())
            .collect()
    }

    /// E-step: expected sufficient statistics over every sequence.
    fn accumulate(&self, data: &Xlengths) -> Result<Statistics, TrainError> {
        let n = self.start_prob.len();
        let d = data.n_features();
        let log_start = self.log_start();
        let log_trans = self.log_transmat();
        let mut stats = Statistics::zeros(n, d);

        for seq in data.sequences() {
            let log_b = log_emissions(seq, &self.emissions);
            let post = posteriors(&log_start, &log_trans, &log_b);
            if !post.log_likelihood.is_finite() {
                return Err(TrainError::Degenerate(format!(
                    "sequence log-likelihood is {}",
                    post.log_likelihood
                )));
            }
            stats.log_likelihood += post.log_likelihood;

            for (acc, g) in stats.start.iter_mut().zip(&post.gamma[0]) {
                *acc += g;
            }
            for (acc_row, xi_row) in stats.trans.iter_mut().zip(&post.xi_sum) {
                for (acc, xi) in acc_row.iter_mut().zip(xi_row) {
                    *acc += xi;
                }
            }
            for (frame, gamma_t) in seq.iter().zip(&post.gamma) {
                for (j, &g) in gamma_t.iter().enumerate() {
                    stats.post[j] += g;
                    for (k, &x) in frame.iter().enumerate() {
                        stats.obs[j][k] += g * x;
                        stats.obs_sq[j][k] += g * x * x;
                    }
                }
            }
        }

        Ok(stats)
    }

    /// M-step. Rows or states that received no posterior mass keep their
    /// current parameters.
    fn maximize(&mut self, stats: &Statistics, min_covar: f64) {
        let mut start = stats.start.clone();
        if normalize(&mut start) {
            self.start_prob = start;
        }

        for (row, counts) in self.transmat.iter_mut().zip(&stats.trans) {
            let mut next = counts.clone();
            if normalize(&mut next) {
                *row = next;
            }
        }

        for (j, emission) in self.emissions.iter_mut().enumerate() {
            let mass = stats.post[j];
            if mass <= MIN_POSTERIOR_MASS {
                continue;
            }
            let mean: Vec<f64> = stats.obs[j].iter().map(|s| s / mass).collect();
            let var = stats.obs_sq[j]
                .iter()
                .zip(&mean)
                .map(|(sq, m)| (sq / mass - m * m).max(0.0) + min_covar)
                .collect();
            *emission = DiagGaussian::new(mean, var);
        }
    }
}

impl HmmModel for GaussianHmm {
    fn n_states(&self) -> usize {
        self.start_prob.len()
    }

    fn n_features(&self) -> usize {
        self.emissions.first().map_or(0, DiagGaussian::dim)
    }

    fn score(&self, data: &Xlengths) -> Result<f64, ScoreError> {
        if data.is_empty() {
            return Err(ScoreError::EmptyData);
        }
        if data.n_features() != self.n_features() {
            return Err(ScoreError::DimensionMismatch {
                expected: self.n_features(),
                got: data.n_features(),
            });
        }

        let log_start = self.log_start();
        let log_trans = self.log_transmat();
        let mut total = 0.0;
        for seq in data.sequences() {
            let log_b = log_emissions(seq, &self.emissions);
            let (_, ll) = forward(&log_start, &log_trans, &log_b);
            total += ll;
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(ScoreError::NonFinite)
        }
    }
}

/// Accumulated E-step statistics.
struct Statistics {
    start: Vec<f64>,
    trans: Vec<Vec<f64>>,
    post: Vec<f64>,
    obs: Vec<Vec<f64>>,
    obs_sq: Vec<Vec<f64>>,
    log_likelihood: f64,
}

impl Statistics {
    fn zeros(n: usize, d: usize) -> Self {
        Self {
            start: vec![0.0; n],
            trans: vec![vec![0.0; n]; n],
            post: vec![0.0; n],
            obs: vec![vec![0.0; d]; n],
            obs_sq: vec![vec![0.0; d]; n],
            log_likelihood: 0.0,
        }
    }
}

/// Baum-Welch trainer for [`GaussianHmm`] with diagonal covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianHmmEngine {
    /// Maximum EM iterations.
    pub n_iter: usize,
    /// Convergence threshold on the per-iteration log-likelihood gain.
    pub tol: f64,
    /// Variance floor.
    pub min_covar: f64,
}

impl Default for GaussianHmmEngine {
    fn default() -> Self {
        Self::from(&TrainerConfig::default())
    }
}

impl From<&TrainerConfig> for GaussianHmmEngine {
    fn from(config: &TrainerConfig) -> Self {
        Self {
            n_iter: config.n_iter,
            tol: config.tol,
            min_covar: config.min_covar,
        }
    }
}

impl HmmEngine for GaussianHmmEngine {
    type Model = GaussianHmm;

    fn fit(&self, data: &Xlengths, n_states: usize, seed: u64) -> Result<GaussianHmm, TrainError> {
        if n_states == 0 {
            return Err(TrainError::InvalidStateCount);
        }
        if data.is_empty() || data.n_features() == 0 {
            return Err(TrainError::EmptyData);
        }
        if data.n_frames() < n_states {
            return Err(TrainError::InsufficientData {
                frames: data.n_frames(),
                states: n_states,
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let global =
            DiagGaussian::from_frames(data.frames(), self.min_covar).ok_or(TrainError::EmptyData)?;
        let centers = kmeans(data.frames(), n_states, &mut rng);

        let uniform = 1.0 / n_states as f64;
        let mut model = GaussianHmm {
            start_prob: vec![uniform; n_states],
            transmat: vec![vec![uniform; n_states]; n_states],
            emissions: centers
                .into_iter()
                .map(|mean| DiagGaussian::new(mean, global.var.clone()))
                .collect(),
        };

        let mut previous = f64::NEG_INFINITY;
        let mut iterations = 0;
        for _ in 0..self.n_iter {
            let stats = model.accumulate(data)?;
            model.maximize(&stats, self.min_covar);
            iterations += 1;
            if stats.log_likelihood - previous < self.tol {
                break;
            }
            previous = stats.log_likelihood;
        }

        if !model.is_well_formed() {
            return Err(TrainError::Degenerate(
                "parameters left the valid region".to_string(),
            ));
        }

        tracing::trace!(
            n_states,
            iterations,
            log_likelihood = previous,
            "baum-welch finished"
        );
        Ok(model)
    }
}

/// Seeded k-means over frames, returning `k` centers.
///
/// Requires `frames.len() >= k`. Ties go to the lowest center index and
/// empty clusters keep their previous center.
fn kmeans(frames: &[Frame], k: usize, rng: &mut StdRng) -> Vec<Frame> {
    let mut centers: Vec<Frame> = rand::seq::index::sample(rng, frames.len(), k)
        .into_iter()
        .map(|i| frames[i].clone())
        .collect();
    let d = centers[0].len();
    let mut assignments = vec![usize::MAX; frames.len()];

    for _ in 0..KMEANS_ITERATIONS {
        let mut changed = false;
        for (frame, slot) in frames.iter().zip(assignments.iter_mut()) {
            let nearest = nearest_center(frame, &centers);
            if *slot != nearest {
                *slot = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0; d]; k];
        let mut counts = vec![0usize; k];
        for (frame, &c) in frames.iter().zip(&assignments) {
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(frame) {
                *s += x;
            }
        }
        for ((center, sum), count) in centers.iter_mut().zip(sums).zip(counts) {
            if count > 0 {
                *center = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }
    }

    centers
}

fn nearest_center(frame: &[f64], centers: &[Frame]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let dist: f64 = frame
            .iter()
            .zip(center)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}
