//! Per-word model bank.

use std::collections::BTreeMap;

use hs_config::Strategy;
use serde::{Deserialize, Serialize};

use crate::hmm::HmmEngine;
use crate::logging::{event_names, Stage};
use crate::select::{CandidateRecord, ModelSelector, SelectError};

/// Trained models keyed by word, iterated in sorted word order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelBank<M> {
    models: BTreeMap<String, M>,
}

impl<M> Default for ModelBank<M> {
    fn default() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }
}

impl<M> ModelBank<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a word's model, returning the previous one.
    pub fn insert(&mut self, word: impl Into<String>, model: M) -> Option<M> {
        self.models.insert(word.into(), model)
    }

    pub fn get(&self, word: &str) -> Option<&M> {
        self.models.get(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.models.contains_key(word)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> + '_ {
        self.models.iter().map(|(w, m)| (w.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<M, S: Into<String>> FromIterator<(S, M)> for ModelBank<M> {
    fn from_iter<I: IntoIterator<Item = (S, M)>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().map(|(w, m)| (w.into(), m)).collect(),
        }
    }
}

/// Selection details kept for each word that made it into the bank.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSummary {
    pub n_states: usize,
    pub criterion: Option<f64>,
    pub candidates: Vec<CandidateRecord>,
}

/// Result of selecting a model for every word in a corpus.
#[derive(Debug, Clone)]
pub struct BankBuild<M> {
    pub strategy: Strategy,
    pub bank: ModelBank<M>,
    pub summaries: BTreeMap<String, SelectionSummary>,
    /// Words with no model, and why.
    pub failures: BTreeMap<String, SelectError>,
}

/// Run `strategy` for every word in the selector's corpus.
///
/// Per-word failures do not abort the build; they are collected in
/// [`BankBuild::failures`] and the word is left out of the bank.
pub fn build_bank<E: HmmEngine>(selector: &ModelSelector<'_, E>, strategy: Strategy) -> BankBuild<E::Model> {
    let mut bank = ModelBank::new();
    let mut summaries = BTreeMap::new();
    let mut failures = BTreeMap::new();

    for word in selector.corpus().all_words() {
        match selector.select_best_model(word, strategy) {
            Ok(selected) => {
                summaries.insert(
                    word.to_string(),
                    SelectionSummary {
                        n_states: selected.n_states,
                        criterion: selected.criterion,
                        candidates: selected.candidates,
                    },
                );
                bank.insert(word, selected.model);
            }
            Err(err) => {
                failures.insert(word.to_string(), err);
            }
        }
    }

    tracing::info!(
        event = event_names::BANK_COMPLETED,
        stage = %Stage::Bank,
        strategy = %strategy,
        models = bank.len(),
        failures = failures.len(),
        "model bank built"
    );

    BankBuild {
        strategy,
        bank,
        summaries,
        failures,
    }
}

/// [`build_bank`] with the strategy named in the selector's configuration.
pub fn build_configured_bank<E: HmmEngine>(selector: &ModelSelector<'_, E>) -> BankBuild<E::Model> {
    build_bank(selector, selector.configured_strategy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::test_utils::{constant_sequences, ScriptedEngine};
    use hs_config::SelectionConfig;

    #[test]
    fn bank_iterates_in_word_order() {
        let bank: ModelBank<u8> = [("DOG", 2), ("CAT", 1), ("EMU", 3)].into_iter().collect();
        let words: Vec<&str> = bank.words().collect();
        assert_eq!(words, vec!["CAT", "DOG", "EMU"]);
        assert_eq!(bank.get("DOG"), Some(&2));
        assert!(!bank.contains("FISH"));
    }

    #[test]
    fn build_collects_models_and_failures() {
        let corpus = Corpus::from_sequences([
            ("CAT", constant_sequences(0.0, 3, 4)),
            ("DOG", constant_sequences(5.0, 3, 4)),
        ])
        .unwrap();
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default().with_state_range(2, 3);
        let selector = ModelSelector::new(&corpus, &engine, &config);

        let build = build_bank(&selector, Strategy::Bic);
        assert_eq!(build.bank.len(), 2);
        assert!(build.failures.is_empty());
        assert_eq!(build.summaries["CAT"].candidates.len(), 2);
    }

    #[test]
    fn configured_build_uses_config_strategy() {
        let corpus = Corpus::from_sequences([
            ("CAT", constant_sequences(0.0, 2, 4)),
            ("DOG", constant_sequences(5.0, 2, 4)),
        ])
        .unwrap();
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default()
            .with_strategy(Strategy::Constant)
            .with_state_range(2, 5)
            .with_n_constant(4);
        let selector = ModelSelector::new(&corpus, &engine, &config);

        let build = build_configured_bank(&selector);
        assert_eq!(build.strategy, Strategy::Constant);
        assert_eq!(build.bank.len(), 2);
        assert_eq!(engine.fit_calls(), vec![(4, config.random_state), (4, config.random_state)]);
        assert!(build.summaries.values().all(|s| s.criterion.is_none()));
    }

    #[test]
    fn failing_word_is_left_out() {
        let corpus = Corpus::from_sequences([("CAT", constant_sequences(0.0, 2, 3))]).unwrap();
        // A single-word vocabulary has no DIC competitors.
        let engine = ScriptedEngine::new();
        let config = SelectionConfig::default().with_state_range(2, 2);
        let selector = ModelSelector::new(&corpus, &engine, &config);

        let build = build_bank(&selector, Strategy::Dic);
        assert!(build.bank.is_empty());
        assert!(matches!(
            build.failures["CAT"],
            SelectError::NoViableModel { .. }
        ));
    }
}
