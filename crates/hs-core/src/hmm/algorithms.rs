//! Log-space forward-backward recursions for a single sequence.
//!
//! Every matrix is indexed `[t][state]` (or `[from][to]` for transitions) and
//! holds natural-log values; zero probabilities are NEG_INFINITY.

use crate::corpus::Frame;
use hs_math::{log_sum_exp, log_sum_exp_pairs, DiagGaussian};

/// Log emission density of every frame under every state.
pub fn log_emissions(frames: &[Frame], emissions: &[DiagGaussian]) -> Vec<Vec<f64>> {
    frames
        .iter()
        .map(|frame| emissions.iter().map(|g| g.log_pdf(frame)).collect())
        .collect()
}

/// Forward pass. Returns (log alpha, log-likelihood).
pub fn forward(
    log_start: &[f64],
    log_trans: &[Vec<f64>],
    log_b: &[Vec<f64>],
) -> (Vec<Vec<f64>>, f64) {
    let n = log_start.len();
    let mut alpha: Vec<Vec<f64>> = Vec::with_capacity(log_b.len());

    let Some(first) = log_b.first() else {
        return (alpha, 0.0);
    };
    alpha.push((0..n).map(|j| log_start[j] + first[j]).collect());

    for b_t in &log_b[1..] {
        let prev = &alpha[alpha.len() - 1];
        let row: Vec<f64> = (0..n)
            .map(|j| b_t[j] + log_sum_exp_pairs((0..n).map(|i| (prev[i], log_trans[i][j]))))
            .collect();
        alpha.push(row);
    }

    let log_likelihood = log_sum_exp(&alpha[alpha.len() - 1]);
    (alpha, log_likelihood)
}

/// Backward pass. Returns log beta.
pub fn backward(log_trans: &[Vec<f64>], log_b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let t_len = log_b.len();
    let n = log_trans.len();
    let mut beta = vec![vec![0.0; n]; t_len];

    for t in (0..t_len.saturating_sub(1)).rev() {
        let next_b = &log_b[t + 1];
        let next_beta = beta[t + 1].clone();
        for (i, slot) in beta[t].iter_mut().enumerate() {
            *slot = log_sum_exp_pairs((0..n).map(|j| (log_trans[i][j], next_b[j] + next_beta[j])));
        }
    }

    beta
}

/// Expected sufficient statistics of one sequence.
#[derive(Debug, Clone)]
pub struct SequencePosteriors {
    /// P(state_t = j | sequence), `[t][j]`.
    pub gamma: Vec<Vec<f64>>,
    /// Expected transition counts summed over t, `[i][j]`.
    pub xi_sum: Vec<Vec<f64>>,
    pub log_likelihood: f64,
}

/// Run forward-backward and collect state/transition posteriors.
pub fn posteriors(
    log_start: &[f64],
    log_trans: &[Vec<f64>],
    log_b: &[Vec<f64>],
) -> SequencePosteriors {
    let n = log_start.len();
    let (alpha, log_likelihood) = forward(log_start, log_trans, log_b);
    let beta = backward(log_trans, log_b);

    let gamma = alpha
        .iter()
        .zip(&beta)
        .map(|(a, b)| {
            a.iter()
                .zip(b)
                .map(|(x, y)| (x + y - log_likelihood).exp())
                .collect()
        })
        .collect();

    let mut xi_sum = vec![vec![0.0; n]; n];
    for t in 0..log_b.len().saturating_sub(1) {
        for (i, xi_row) in xi_sum.iter_mut().enumerate() {
            for (j, cell) in xi_row.iter_mut().enumerate() {
                let log_xi = alpha[t][i] + log_trans[i][j] + log_b[t + 1][j] + beta[t + 1][j]
                    - log_likelihood;
                *cell += log_xi.exp();
            }
        }
    }

    SequencePosteriors {
        gamma,
        xi_sum,
        log_likelihood,
    }
}
