//! Per-word model selection.
//!
//! [`ModelSelector::select_best_model`] runs one of four strategies over a
//! word's training data and returns the chosen model together with the full
//! candidate trail:
//!
//! - **Constant**: a single fit at `n_constant` states.
//! - **BIC**: minimise `-2 logL + p ln N` over the state range.
//! - **DIC**: maximise `logL(own) - mean logL(competitors)`.
//! - **CV**: maximise the mean held-out log-likelihood over k folds, then
//!   refit the winner on all of the word's data.
//!
//! Candidates are visited in ascending state order and only a strictly
//! better criterion replaces the incumbent, so ties keep the smaller model.
//! A candidate whose training or scoring fails is recorded and skipped.

pub mod bic;
pub mod constant;
pub mod cv;
pub mod dic;
mod search;

pub use bic::{bic_parameter_count, bic_score};
pub use dic::dic_score;

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use hs_config::{SelectionConfig, Strategy};
use thiserror::Error;

use crate::corpus::{Corpus, Xlengths};
use crate::hmm::{HmmEngine, ScoreError, TrainError};
use crate::logging::{event_names, Stage};
use crate::trainer::ModelTrainer;
use search::Best;

/// Selection failure for one word.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectError {
    #[error("word {0:?} is not in the corpus")]
    UnknownWord(String),

    #[error("state range {min}..={max} is empty")]
    NoCandidates { min: usize, max: usize },

    #[error("n_constant {n_constant} lies outside state range {min}..={max}")]
    ConstantOutOfRange {
        n_constant: usize,
        min: usize,
        max: usize,
    },

    #[error("no {strategy} candidate for {word:?} could be trained and scored")]
    NoViableModel { word: String, strategy: Strategy },

    #[error("refit of {word:?} at {n_states} states failed: {source}")]
    RefitFailed {
        word: String,
        n_states: usize,
        #[source]
        source: TrainError,
    },

    #[error("could not rebuild fold data for {word:?}: {message}")]
    FoldData { word: String, message: String },
}

/// What happened to one candidate state count.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    /// Trained and scored; the value is the strategy's criterion.
    Scored(f64),
    TrainFailed(TrainError),
    ScoreFailed(ScoreError),
}

impl CandidateOutcome {
    pub fn criterion(&self) -> Option<f64> {
        match self {
            CandidateOutcome::Scored(value) => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for CandidateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateOutcome::Scored(value) => write!(f, "scored {value}"),
            CandidateOutcome::TrainFailed(err) => write!(f, "training failed: {err}"),
            CandidateOutcome::ScoreFailed(err) => write!(f, "scoring failed: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub n_states: usize,
    pub outcome: CandidateOutcome,
}

/// Winning model for a word.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedModel<M> {
    pub word: String,
    pub strategy: Strategy,
    pub n_states: usize,
    /// Winning criterion; `None` for the constant strategy.
    pub criterion: Option<f64>,
    pub model: M,
    /// Every candidate visited, in ascending state order.
    pub candidates: Vec<CandidateRecord>,
}

/// Selects a model per word from a shared corpus.
pub struct ModelSelector<'a, E: HmmEngine> {
    corpus: &'a Corpus,
    trainer: ModelTrainer<'a, E>,
    strategy: Strategy,
    n_constant: usize,
    min_states: usize,
    max_states: usize,
    max_folds: usize,
    excluded: BTreeSet<String>,
}

impl<'a, E: HmmEngine> ModelSelector<'a, E> {
    pub fn new(corpus: &'a Corpus, engine: &'a E, config: &SelectionConfig) -> Self {
        Self {
            corpus,
            trainer: ModelTrainer::new(engine, config.random_state).with_verbose(config.verbose),
            strategy: config.strategy,
            n_constant: config.n_constant,
            min_states: config.min_states,
            max_states: config.max_states,
            max_folds: config.cross_validation.max_folds,
            excluded: BTreeSet::new(),
        }
    }

    /// Leave these words out of every DIC competitor set.
    pub fn with_excluded_competitors<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(words.into_iter().map(Into::into));
        self
    }

    pub fn corpus(&self) -> &'a Corpus {
        self.corpus
    }

    pub fn trainer(&self) -> &ModelTrainer<'a, E> {
        &self.trainer
    }

    /// Strategy named by the configuration this selector was built from.
    pub fn configured_strategy(&self) -> Strategy {
        self.strategy
    }

    /// Candidate state counts, ascending.
    pub fn state_range(&self) -> RangeInclusive<usize> {
        self.min_states..=self.max_states
    }

    /// Run `strategy` for `word`.
    pub fn select_best_model(
        &self,
        word: &str,
        strategy: Strategy,
    ) -> Result<SelectedModel<E::Model>, SelectError> {
        let data = self
            .corpus
            .word(word)
            .ok_or_else(|| SelectError::UnknownWord(word.to_string()))?;

        let result = match strategy {
            Strategy::Constant => constant::select(self, word, data),
            Strategy::Bic => bic::select(self, word, data),
            Strategy::Dic => dic::select(self, word, data),
            Strategy::Cv => cv::select(self, word, data),
        };

        match &result {
            Ok(selected) => tracing::debug!(
                event = event_names::SELECTION_COMPLETED,
                stage = %Stage::Select,
                word,
                strategy = %strategy,
                n_states = selected.n_states,
                criterion = ?selected.criterion,
                "model selected"
            ),
            Err(err) => tracing::warn!(
                event = event_names::SELECTION_FAILED,
                stage = %Stage::Select,
                word,
                strategy = %strategy,
                error = %err,
                "selection failed"
            ),
        }
        result
    }

    /// Candidate range, or `NoCandidates` when it is empty.
    fn candidates(&self) -> Result<RangeInclusive<usize>, SelectError> {
        if self.min_states > self.max_states {
            return Err(SelectError::NoCandidates {
                min: self.min_states,
                max: self.max_states,
            });
        }
        Ok(self.state_range())
    }

    /// Every other word's data, minus explicitly excluded words.
    fn competitors(&self, word: &str) -> Vec<&'a Xlengths> {
        self.corpus
            .all_xlengths()
            .filter(|(other, _)| *other != word && !self.excluded.contains(*other))
            .map(|(_, xl)| xl)
            .collect()
    }
}

/// Turn a finished search into the caller-facing result.
fn conclude<M>(
    word: &str,
    strategy: Strategy,
    best: Option<Best<M>>,
    candidates: Vec<CandidateRecord>,
) -> Result<SelectedModel<M>, SelectError> {
    let best = best.ok_or_else(|| SelectError::NoViableModel {
        word: word.to_string(),
        strategy,
    })?;
    Ok(SelectedModel {
        word: word.to_string(),
        strategy,
        n_states: best.n_states,
        criterion: Some(best.criterion),
        model: best.model,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{constant_sequences, ScriptedEngine};

    fn corpus() -> Corpus {
        Corpus::from_sequences([
            ("CAT", constant_sequences(0.0, 3, 4)),
            ("DOG", constant_sequences(5.0, 3, 5)),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_word_is_reported() {
        let corpus = corpus();
        let engine = ScriptedEngine::new();
        let selector = ModelSelector::new(&corpus, &engine, &SelectionConfig::default());
        for strategy in Strategy::ALL {
            assert_eq!(
                selector.select_best_model("FISH", strategy).unwrap_err(),
                SelectError::UnknownWord("FISH".into())
            );
        }
        assert!(engine.fits().is_empty());
    }

    #[test]
    fn empty_range_is_no_candidates() {
        let corpus = corpus();
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default().with_state_range(5, 3);
        let selector = ModelSelector::new(&corpus, &engine, &config);
        for strategy in [Strategy::Bic, Strategy::Dic, Strategy::Cv] {
            assert_eq!(
                selector.select_best_model("CAT", strategy).unwrap_err(),
                SelectError::NoCandidates { min: 5, max: 3 }
            );
        }
    }

    #[test]
    fn competitors_respect_exclusions() {
        let corpus = Corpus::from_sequences([
            ("CAT", constant_sequences(0.0, 1, 3)),
            ("DOG", constant_sequences(1.0, 1, 3)),
            ("EMU", constant_sequences(2.0, 1, 3)),
        ])
        .unwrap();
        let engine = ScriptedEngine::new();
        let selector = ModelSelector::new(&corpus, &engine, &SelectionConfig::default())
            .with_excluded_competitors(["EMU"]);
        let competitors = selector.competitors("CAT");
        assert_eq!(competitors.len(), 1);
        assert_eq!(competitors[0], corpus.xlengths_for("DOG").unwrap());
    }

    #[test]
    fn outcome_display_names_the_failure() {
        let outcome = CandidateOutcome::TrainFailed(TrainError::InvalidStateCount);
        assert!(outcome.to_string().starts_with("training failed"));
        assert_eq!(CandidateOutcome::Scored(1.5).criterion(), Some(1.5));
    }
}
