//! HMM engine seam.
//!
//! The selectors only ever see two capabilities: fit a model with a given
//! state count and seed, and score data under a fitted model. Both report
//! failure as a value. [`GaussianHmmEngine`] is the engine shipped with the
//! crate; anything implementing [`HmmEngine`] can be plugged in instead.

pub mod algorithms;
pub mod gaussian;

pub use gaussian::{GaussianHmm, GaussianHmmEngine};

use crate::corpus::Xlengths;
use thiserror::Error;

/// Training failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("state count must be at least 1")]
    InvalidStateCount,

    #[error("no training frames")]
    EmptyData,

    #[error("{frames} frames cannot support {states} states")]
    InsufficientData { frames: usize, states: usize },

    #[error("degenerate fit: {0}")]
    Degenerate(String),
}

/// Scoring failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("no frames to score")]
    EmptyData,

    #[error("model expects {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("log-likelihood is not a number")]
    NonFinite,
}

/// A trained model.
pub trait HmmModel {
    fn n_states(&self) -> usize;

    fn n_features(&self) -> usize;

    /// Total log-likelihood of every sequence in `data`.
    fn score(&self, data: &Xlengths) -> Result<f64, ScoreError>;
}

/// Something that can fit an [`HmmModel`].
///
/// Implementations must be deterministic in `seed`: the same data, state
/// count and seed yield the same model.
pub trait HmmEngine {
    type Model: HmmModel;

    fn fit(&self, data: &Xlengths, n_states: usize, seed: u64) -> Result<Self::Model, TrainError>;
}
