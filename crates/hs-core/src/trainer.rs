//! Model trainer: one engine fit per (word, state count).
//!
//! The trainer owns nothing but configuration. It forwards the fixed seed to
//! every fit so repeated runs produce identical candidates, and turns engine
//! failure into a logged `Err` that callers branch on.

use crate::corpus::Xlengths;
use crate::hmm::{HmmEngine, TrainError};
use crate::logging::{event_names, Stage};

/// Wraps an [`HmmEngine`] with a fixed seed and verbosity.
#[derive(Debug)]
pub struct ModelTrainer<'a, E> {
    engine: &'a E,
    random_state: u64,
    verbose: bool,
}

impl<E> Clone for ModelTrainer<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ModelTrainer<'_, E> {}

impl<'a, E: HmmEngine> ModelTrainer<'a, E> {
    pub fn new(engine: &'a E, random_state: u64) -> Self {
        Self {
            engine,
            random_state,
            verbose: false,
        }
    }

    /// Log candidate outcomes at info instead of debug.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn engine(&self) -> &'a E {
        self.engine
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// Fit `n_states` states to `data`.
    pub fn train(&self, word: &str, data: &Xlengths, n_states: usize) -> Result<E::Model, TrainError> {
        let result = self.engine.fit(data, n_states, self.random_state);
        match &result {
            Ok(_) => {
                if self.verbose {
                    tracing::info!(
                        event = event_names::CANDIDATE_TRAINED,
                        stage = %Stage::Train,
                        word,
                        n_states,
                        "model created"
                    );
                } else {
                    tracing::debug!(
                        event = event_names::CANDIDATE_TRAINED,
                        stage = %Stage::Train,
                        word,
                        n_states,
                        "model created"
                    );
                }
            }
            Err(err) => {
                if self.verbose {
                    tracing::info!(
                        event = event_names::CANDIDATE_TRAIN_FAILED,
                        stage = %Stage::Train,
                        word,
                        n_states,
                        error = %err,
                        "training failed"
                    );
                } else {
                    tracing::debug!(
                        event = event_names::CANDIDATE_TRAIN_FAILED,
                        stage = %Stage::Train,
                        word,
                        n_states,
                        error = %err,
                        "training failed"
                    );
                }
            }
        }
        result
    }
}
