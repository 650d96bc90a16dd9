//! Test utilities for hs-core.
//!
//! [`ScriptedEngine`] is an [`HmmEngine`] whose log-likelihoods are chosen
//! by the test, so selection behaviour can be checked against hand-computed
//! criteria without running Baum-Welch. It also records every fit call.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::corpus::{Sequence, Xlengths};
use crate::hmm::{HmmEngine, HmmModel, ScoreError, TrainError};

/// Assert that two floating point numbers are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {
        $crate::assert_approx_eq!($a, $b, 1e-9_f64)
    };
    ($a:expr, $b:expr, $epsilon:expr) => {{
        let a: f64 = $a;
        let b: f64 = $b;
        let eps: f64 = $epsilon;
        assert!(
            (a - b).abs() <= eps,
            "assertion failed: |{} - {}| = {} > {}",
            a,
            b,
            (a - b).abs(),
            eps
        );
    }};
}

/// Per-frame log-likelihood on the data a model was trained on.
pub const DEFAULT_OWN_LL: f64 = -1.0;

/// Per-frame log-likelihood on any other data.
pub const DEFAULT_FOREIGN_LL: f64 = -2.0;

/// What one `fit` call received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitRecord {
    pub n_states: usize,
    pub seed: u64,
    pub n_frames: usize,
    pub n_sequences: usize,
}

/// Engine with scripted per-state-count behaviour.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    own: BTreeMap<usize, f64>,
    foreign: BTreeMap<usize, f64>,
    fail_train: BTreeSet<usize>,
    fail_score: BTreeSet<usize>,
    fits: RefCell<Vec<FitRecord>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models with `n` states score `ll` per frame on their training data.
    pub fn with_own(mut self, n: usize, ll: f64) -> Self {
        self.own.insert(n, ll);
        self
    }

    /// Models with `n` states score `ll` per frame on other data.
    pub fn with_foreign(mut self, n: usize, ll: f64) -> Self {
        self.foreign.insert(n, ll);
        self
    }

    pub fn fail_training_at(mut self, n: usize) -> Self {
        self.fail_train.insert(n);
        self
    }

    pub fn fail_scoring_at(mut self, n: usize) -> Self {
        self.fail_score.insert(n);
        self
    }

    pub fn fits(&self) -> Vec<FitRecord> {
        self.fits.borrow().clone()
    }

    /// `(n_states, seed)` of every fit, in call order.
    pub fn fit_calls(&self) -> Vec<(usize, u64)> {
        self.fits
            .borrow()
            .iter()
            .map(|r| (r.n_states, r.seed))
            .collect()
    }
}

impl HmmEngine for ScriptedEngine {
    type Model = ScriptedModel;

    fn fit(&self, data: &Xlengths, n_states: usize, seed: u64) -> Result<ScriptedModel, TrainError> {
        self.fits.borrow_mut().push(FitRecord {
            n_states,
            seed,
            n_frames: data.n_frames(),
            n_sequences: data.n_sequences(),
        });
        if self.fail_train.contains(&n_states) {
            return Err(TrainError::Degenerate(format!("scripted failure at {n_states}")));
        }
        if data.is_empty() {
            return Err(TrainError::EmptyData);
        }
        Ok(ScriptedModel {
            n_states,
            n_features: data.n_features(),
            seed,
            training: data.clone(),
            own: self.own.get(&n_states).copied().unwrap_or(DEFAULT_OWN_LL),
            foreign: self
                .foreign
                .get(&n_states)
                .copied()
                .unwrap_or(DEFAULT_FOREIGN_LL),
            fail_score: self.fail_score.contains(&n_states),
        })
    }
}

/// Model produced by [`ScriptedEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedModel {
    pub n_states: usize,
    pub n_features: usize,
    pub seed: u64,
    pub training: Xlengths,
    pub own: f64,
    pub foreign: f64,
    pub fail_score: bool,
}

impl ScriptedModel {
    /// Standalone model for recognizer tests.
    pub fn fixed(training: Xlengths, own: f64, foreign: f64) -> Self {
        Self {
            n_states: 1,
            n_features: training.n_features(),
            seed: 0,
            training,
            own,
            foreign,
            fail_score: false,
        }
    }

    pub fn failing(training: Xlengths) -> Self {
        Self {
            fail_score: true,
            ..Self::fixed(training, 0.0, 0.0)
        }
    }
}

impl HmmModel for ScriptedModel {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, data: &Xlengths) -> Result<f64, ScoreError> {
        if self.fail_score {
            return Err(ScoreError::NonFinite);
        }
        if data.is_empty() {
            return Err(ScoreError::EmptyData);
        }
        let per_frame = if *data == self.training {
            self.own
        } else {
            self.foreign
        };
        Ok(per_frame * data.n_frames() as f64)
    }
}

/// `count` one-feature sequences of `len` frames, offset by `base`.
pub fn constant_sequences(base: f64, count: usize, len: usize) -> Vec<Sequence> {
    (0..count)
        .map(|s| {
            (0..len)
                .map(|t| vec![base + (s * len + t) as f64 * 0.01])
                .collect()
        })
        .collect()
}
