//! Discriminative Information Criterion.
//!
//! `DIC = logL(own data) - mean(logL(each competitor's data))`. A model that
//! fits its own word well and every other word badly scores high. Higher
//! is better.
//!
//! Competitors are every other word in the corpus except those excluded on
//! the selector. A candidate is skipped when its own score or any competitor
//! score fails, and when there are no competitors at all.

use hs_config::Strategy;
use hs_math::mean;

use super::search::{CandidateSearch, Direction};
use super::{conclude, ModelSelector, SelectError, SelectedModel};
use crate::corpus::{WordData, Xlengths};
use crate::hmm::{HmmEngine, HmmModel, ScoreError};

/// `own - mean(anti)`, or `None` when `anti` is empty.
pub fn dic_score(own: f64, anti: &[f64]) -> Option<f64> {
    mean(anti).map(|m| own - m)
}

pub fn select<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    data: &WordData,
) -> Result<SelectedModel<E::Model>, SelectError> {
    let range = selector.candidates()?;
    let xl = data.xlengths();
    let competitors = selector.competitors(word);
    let mut search = CandidateSearch::new(word, Strategy::Dic, Direction::Maximize);

    for n_states in range {
        let model = match selector.trainer.train(word, xl, n_states) {
            Ok(model) => model,
            Err(err) => {
                search.train_failed(n_states, err);
                continue;
            }
        };
        match discriminative_score(&model, xl, &competitors) {
            Ok(dic) => search.offer(n_states, dic, model),
            Err(err) => search.score_failed(n_states, err),
        }
    }

    let (best, candidates) = search.finish();
    conclude(word, Strategy::Dic, best, candidates)
}

fn discriminative_score<M: HmmModel>(
    model: &M,
    own: &Xlengths,
    competitors: &[&Xlengths],
) -> Result<f64, ScoreError> {
    let own_ll = model.score(own)?;
    let anti = competitors
        .iter()
        .map(|xl| model.score(xl))
        .collect::<Result<Vec<_>, _>>()?;
    dic_score(own_ll, &anti).ok_or(ScoreError::EmptyData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::corpus::Corpus;
    use crate::select::CandidateOutcome;
    use crate::test_utils::{constant_sequences, ScriptedEngine};
    use hs_config::SelectionConfig;

    #[test]
    fn score_formula() {
        assert_approx_eq!(dic_score(-10.0, &[-30.0, -50.0]).unwrap(), 30.0);
        assert!(dic_score(-10.0, &[]).is_none());
    }

    fn corpus() -> Corpus {
        Corpus::from_sequences([
            ("CAT", constant_sequences(0.0, 2, 5)), // 10 frames
            ("DOG", constant_sequences(3.0, 1, 4)), // 4 frames
            ("EMU", constant_sequences(6.0, 2, 3)), // 6 frames
        ])
        .unwrap()
    }

    #[test]
    fn picks_maximum_dic() {
        let corpus = corpus();
        let engine = ScriptedEngine::new()
            .with_own(2, -1.0)
            .with_foreign(2, -2.0)
            .with_own(3, -1.0)
            .with_foreign(3, -4.0)
            .with_own(4, -0.5)
            .with_foreign(4, -0.6);
        let config = SelectionConfig::default().with_state_range(2, 4);
        let selected = ModelSelector::new(&corpus, &engine, &config)
            .select_best_model("CAT", Strategy::Dic)
            .unwrap();

        // own = 10 * own_ll; anti mean = (4 + 6) / 2 * foreign_ll = 5 * foreign_ll.
        let dic = |own: f64, foreign: f64| 10.0 * own - 5.0 * foreign;
        assert_eq!(selected.n_states, 3);
        assert_approx_eq!(selected.criterion.unwrap(), dic(-1.0, -4.0));
        let scored: Vec<f64> = selected
            .candidates
            .iter()
            .filter_map(|c| c.outcome.criterion())
            .collect();
        assert_eq!(scored.len(), 3);
        assert_approx_eq!(scored[0], dic(-1.0, -2.0));
        assert_approx_eq!(scored[2], dic(-0.5, -0.6));
    }

    #[test]
    fn excluded_competitors_are_ignored() {
        let corpus = corpus();
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default().with_state_range(2, 2);
        let selected = ModelSelector::new(&corpus, &engine, &config)
            .with_excluded_competitors(["EMU"])
            .select_best_model("CAT", Strategy::Dic)
            .unwrap();
        // Only DOG (4 frames) remains.
        assert_approx_eq!(selected.criterion.unwrap(), 10.0 * -1.0 - 4.0 * -2.0);
    }

    #[test]
    fn single_word_vocabulary_has_no_viable_model() {
        let corpus = Corpus::from_sequences([("CAT", constant_sequences(0.0, 2, 5))]).unwrap();
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default().with_state_range(2, 3);
        let selector = ModelSelector::new(&corpus, &engine, &config);
        let err = selector.select_best_model("CAT", Strategy::Dic).unwrap_err();
        assert!(matches!(err, SelectError::NoViableModel { .. }));
    }

    #[test]
    fn competitor_scoring_failure_skips_candidate() {
        let corpus = corpus();
        let engine = ScriptedEngine::new().fail_scoring_at(2);
        let config = SelectionConfig::default().with_state_range(2, 3);
        let selected = ModelSelector::new(&corpus, &engine, &config)
            .select_best_model("CAT", Strategy::Dic)
            .unwrap();
        assert_eq!(selected.n_states, 3);
        assert!(matches!(
            selected.candidates[0].outcome,
            CandidateOutcome::ScoreFailed(_)
        ));
    }
}
