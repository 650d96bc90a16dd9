//! K-fold cross-validation.
//!
//! Each candidate is trained on every fold's training split and scored on
//! the held-out split; its criterion is the mean held-out log-likelihood in
//! fold order. A failure in any fold skips the candidate. A word with a
//! single sequence cannot hold anything out, so its candidates are scored
//! on the full data instead.
//!
//! Fold models are dropped. The winning state count is refit on the word's
//! full data and that model is returned.

use hs_config::Strategy;
use hs_math::mean;

use super::search::{CandidateSearch, Direction};
use super::{ModelSelector, SelectError, SelectedModel};
use crate::corpus::{WordData, Xlengths};
use crate::folds::{fold_count, KFold};
use crate::hmm::{HmmEngine, HmmModel, ScoreError, TrainError};

/// Why one candidate could not be evaluated.
enum FoldFailure {
    Train(TrainError),
    Score(ScoreError),
}

pub fn select<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    data: &WordData,
) -> Result<SelectedModel<E::Model>, SelectError> {
    let range = selector.candidates()?;
    let full = data.xlengths();

    let n_sequences = data.sequences().len();
    let splits: Vec<(Xlengths, Xlengths)> = match fold_count(n_sequences, selector.max_folds) {
        Some(k) => KFold::new(k)
            .split(n_sequences)
            .iter()
            .map(|fold| fold.xlengths(data.sequences()))
            .collect::<Result<_, _>>()
            .map_err(|err| SelectError::FoldData {
                word: word.to_string(),
                message: err.to_string(),
            })?,
        None => Vec::new(),
    };

    let mut search = CandidateSearch::new(word, Strategy::Cv, Direction::Maximize);
    for n_states in range {
        let evaluated = if splits.is_empty() {
            self_score(selector, word, full, n_states)
        } else {
            held_out_mean(selector, word, &splits, n_states)
        };
        match evaluated {
            Ok(value) => search.offer(n_states, value, ()),
            Err(FoldFailure::Train(err)) => search.train_failed(n_states, err),
            Err(FoldFailure::Score(err)) => search.score_failed(n_states, err),
        }
    }

    let (best, candidates) = search.finish();
    let best = best.ok_or_else(|| SelectError::NoViableModel {
        word: word.to_string(),
        strategy: Strategy::Cv,
    })?;

    let model = selector
        .trainer
        .train(word, full, best.n_states)
        .map_err(|source| SelectError::RefitFailed {
            word: word.to_string(),
            n_states: best.n_states,
            source,
        })?;

    Ok(SelectedModel {
        word: word.to_string(),
        strategy: Strategy::Cv,
        n_states: best.n_states,
        criterion: Some(best.criterion),
        model,
        candidates,
    })
}

fn held_out_mean<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    splits: &[(Xlengths, Xlengths)],
    n_states: usize,
) -> Result<f64, FoldFailure> {
    let mut scores = Vec::with_capacity(splits.len());
    for (train, test) in splits {
        let model = selector
            .trainer
            .train(word, train, n_states)
            .map_err(FoldFailure::Train)?;
        scores.push(model.score(test).map_err(FoldFailure::Score)?);
    }
    mean(&scores).ok_or(FoldFailure::Score(ScoreError::EmptyData))
}

fn self_score<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    full: &Xlengths,
    n_states: usize,
) -> Result<f64, FoldFailure> {
    let model = selector
        .trainer
        .train(word, full, n_states)
        .map_err(FoldFailure::Train)?;
    model.score(full).map_err(FoldFailure::Score)
}
