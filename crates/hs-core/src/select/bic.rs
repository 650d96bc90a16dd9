//! Bayesian Information Criterion.
//!
//! `BIC = -2 logL + p ln N`, where `N` is the word's total frame count and
//! `p` counts the free parameters of a diagonal Gaussian HMM:
//! `n^2 + 2 n f - 1` for `n` states and `f` features. Lower is better.

use hs_config::Strategy;

use super::search::{CandidateSearch, Direction};
use super::{conclude, ModelSelector, SelectError, SelectedModel};
use crate::corpus::WordData;
use crate::hmm::{HmmEngine, HmmModel};

/// Free parameters of an `n_states` model over `n_features` features.
pub fn bic_parameter_count(n_states: usize, n_features: usize) -> usize {
    (n_states * n_states + 2 * n_states * n_features).saturating_sub(1)
}

pub fn bic_score(log_likelihood: f64, n_parameters: usize, n_frames: usize) -> f64 {
    -2.0 * log_likelihood + n_parameters as f64 * (n_frames as f64).ln()
}

pub fn select<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    data: &WordData,
) -> Result<SelectedModel<E::Model>, SelectError> {
    let range = selector.candidates()?;
    let xl = data.xlengths();
    let mut search = CandidateSearch::new(word, Strategy::Bic, Direction::Minimize);

    for n_states in range {
        let model = match selector.trainer.train(word, xl, n_states) {
            Ok(model) => model,
            Err(err) => {
                search.train_failed(n_states, err);
                continue;
            }
        };
        match model.score(xl) {
            Ok(log_likelihood) => {
                let p = bic_parameter_count(n_states, model.n_features());
                search.offer(n_states, bic_score(log_likelihood, p, xl.n_frames()), model);
            }
            Err(err) => search.score_failed(n_states, err),
        }
    }

    let (best, candidates) = search.finish();
    conclude(word, Strategy::Bic, best, candidates)
}
