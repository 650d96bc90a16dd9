//! Maximum-likelihood recognition against a model bank.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::bank::ModelBank;
use crate::corpus::Xlengths;
use crate::hmm::HmmModel;
use crate::logging::{event_names, Stage};

/// Log-likelihood of one item under every word's model.
pub type ScoreTable = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizeError {
    #[error("model bank is empty")]
    EmptyModelBank,
}

/// Scores and best guesses, one entry per input item in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub probabilities: Vec<ScoreTable>,
    pub guesses: Vec<String>,
}

impl Recognition {
    /// Fraction of labeled items whose guess differs from the label.
    /// Unlabeled items are ignored; `None` when nothing is labeled.
    pub fn word_error_rate<'l, I>(&self, labels: I) -> Option<f64>
    where
        I: IntoIterator<Item = Option<&'l str>>,
    {
        let mut labeled = 0usize;
        let mut wrong = 0usize;
        for (guess, label) in self.guesses.iter().zip(labels) {
            if let Some(label) = label {
                labeled += 1;
                if guess != label {
                    wrong += 1;
                }
            }
        }
        (labeled > 0).then(|| wrong as f64 / labeled as f64)
    }
}

/// Score every item against every model and pick the arg-max word.
///
/// A model that fails to score an item, or returns a non-finite score,
/// contributes negative infinity for that item only. Ties, including an item no model can score, go to the
/// alphabetically first word.
pub fn recognize<'x, M, I>(bank: &ModelBank<M>, items: I) -> Result<Recognition, RecognizeError>
where
    M: HmmModel,
    I: IntoIterator<Item = &'x Xlengths>,
{
    if bank.is_empty() {
        return Err(RecognizeError::EmptyModelBank);
    }

    let mut probabilities = Vec::new();
    let mut guesses = Vec::new();
    let mut unscored = 0usize;

    for item in items {
        let mut table = ScoreTable::new();
        let mut best: Option<(&str, f64)> = None;
        for (word, model) in bank.iter() {
            let score = match model.score(item) {
                Ok(score) if score.is_finite() => score,
                _ => {
                    unscored += 1;
                    f64::NEG_INFINITY
                }
            };
            table.insert(word.to_string(), score);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((word, score));
            }
        }
        // Non-empty bank, so every item has a best word.
        if let Some((word, _)) = best {
            guesses.push(word.to_string());
        }
        probabilities.push(table);
    }

    tracing::debug!(
        event = event_names::RECOGNIZE_COMPLETED,
        stage = %Stage::Recognize,
        items = guesses.len(),
        models = bank.len(),
        unscored,
        "recognition finished"
    );

    Ok(Recognition {
        probabilities,
        guesses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedModel;

    fn item(value: f64) -> Xlengths {
        Xlengths::from_sequences(&[vec![vec![value], vec![value + 0.5]]]).unwrap()
    }

    #[test]
    fn empty_bank_is_an_error() {
        let bank: ModelBank<ScriptedModel> = ModelBank::new();
        let items = [item(0.0)];
        assert_eq!(
            recognize(&bank, &items).unwrap_err(),
            RecognizeError::EmptyModelBank
        );
    }

    #[test]
    fn picks_highest_scoring_word() {
        let cat = item(0.0);
        let dog = item(5.0);
        let bank: ModelBank<ScriptedModel> = [
            ("CAT", ScriptedModel::fixed(cat.clone(), -1.0, -3.0)),
            ("DOG", ScriptedModel::fixed(dog.clone(), -1.0, -3.0)),
        ]
        .into_iter()
        .collect();

        let result = recognize(&bank, [&dog, &cat]).unwrap();
        assert_eq!(result.guesses, vec!["DOG", "CAT"]);
        assert_eq!(result.probabilities[0]["DOG"], -2.0);
        assert_eq!(result.probabilities[0]["CAT"], -6.0);
    }

    #[test]
    fn failing_model_scores_negative_infinity_only_for_itself() {
        let cat = item(0.0);
        let bank: ModelBank<ScriptedModel> = [
            ("BAD", ScriptedModel::failing(cat.clone())),
            ("CAT", ScriptedModel::fixed(cat.clone(), -1.0, -3.0)),
        ]
        .into_iter()
        .collect();

        let result = recognize(&bank, [&cat]).unwrap();
        assert_eq!(result.probabilities[0]["BAD"], f64::NEG_INFINITY);
        assert_eq!(result.probabilities[0]["CAT"], -2.0);
        assert_eq!(result.guesses, vec!["CAT"]);
    }

    #[test]
    fn non_finite_score_counts_as_failure() {
        let x = item(0.0);
        let other = item(9.0);
        let bank: ModelBank<ScriptedModel> = [
            ("APE", ScriptedModel::fixed(other.clone(), -1.0, f64::NAN)),
            ("CAT", ScriptedModel::fixed(other.clone(), -1.0, -3.0)),
            ("EMU", ScriptedModel::fixed(other.clone(), -1.0, f64::INFINITY)),
        ]
        .into_iter()
        .collect();

        let result = recognize(&bank, [&x]).unwrap();
        assert_eq!(result.probabilities[0]["APE"], f64::NEG_INFINITY);
        assert_eq!(result.probabilities[0]["EMU"], f64::NEG_INFINITY);
        assert_eq!(result.guesses, vec!["CAT"]);
    }

    #[test]
    fn all_failures_fall_back_to_first_word() {
        let x = item(0.0);
        let bank: ModelBank<ScriptedModel> = [
            ("ZEBRA", ScriptedModel::failing(x.clone())),
            ("APE", ScriptedModel::failing(x.clone())),
        ]
        .into_iter()
        .collect();
        let result = recognize(&bank, [&x]).unwrap();
        assert_eq!(result.guesses, vec!["APE"]);
    }

    #[test]
    fn ties_go_to_alphabetically_first_word() {
        let x = item(0.0);
        let other = item(9.0);
        let bank: ModelBank<ScriptedModel> = [
            ("B", ScriptedModel::fixed(other.clone(), -1.0, -4.0)),
            ("A", ScriptedModel::fixed(other.clone(), -1.0, -4.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(recognize(&bank, [&x]).unwrap().guesses, vec!["A"]);
    }

    #[test]
    fn empty_item_list_gives_empty_output() {
        let bank: ModelBank<ScriptedModel> =
            [("CAT", ScriptedModel::fixed(item(0.0), -1.0, -2.0))].into_iter().collect();
        let result = recognize(&bank, std::iter::empty()).unwrap();
        assert!(result.guesses.is_empty());
        assert!(result.probabilities.is_empty());
    }

    #[test]
    fn word_error_rate_counts_labeled_items() {
        let recognition = Recognition {
            probabilities: vec![ScoreTable::new(); 3],
            guesses: vec!["CAT".into(), "DOG".into(), "CAT".into()],
        };
        let wer = recognition.word_error_rate([Some("CAT"), Some("CAT"), None]);
        assert_eq!(wer, Some(0.5));
        assert_eq!(recognition.word_error_rate([None, None, None]), None);
    }
}
