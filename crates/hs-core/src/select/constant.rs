//! Fixed state count, no search.

use hs_config::Strategy;

use super::{ModelSelector, SelectError, SelectedModel};
use crate::corpus::WordData;
use crate::hmm::HmmEngine;

/// Train once at `n_constant` states. The model is never scored, so the
/// result carries no criterion and no candidate trail. `n_constant` must lie
/// in the selector's state range.
pub fn select<E: HmmEngine>(
    selector: &ModelSelector<'_, E>,
    word: &str,
    data: &WordData,
) -> Result<SelectedModel<E::Model>, SelectError> {
    let n_states = selector.n_constant;
    if !selector.state_range().contains(&n_states) {
        return Err(SelectError::ConstantOutOfRange {
            n_constant: n_states,
            min: selector.min_states,
            max: selector.max_states,
        });
    }
    let model = selector
        .trainer
        .train(word, data.xlengths(), n_states)
        .map_err(|_| SelectError::NoViableModel {
            word: word.to_string(),
            strategy: Strategy::Constant,
        })?;

    Ok(SelectedModel {
        word: word.to_string(),
        strategy: Strategy::Constant,
        n_states,
        criterion: None,
        model,
        candidates: Vec::new(),
    })
}
