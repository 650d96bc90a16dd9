//! HMM topology selection and word recognition.
//!
//! For each word in a labeled corpus, a [`ModelSelector`] searches a range of
//! hidden-state counts and keeps the model chosen by one of four strategies
//! (constant, BIC, DIC, cross-validation). The per-word winners form a
//! [`ModelBank`], and [`recognize`] labels unseen sequences by maximum
//! log-likelihood against that bank.
//!
//! The HMM itself sits behind the [`HmmEngine`] / [`HmmModel`] traits;
//! [`GaussianHmmEngine`] is the diagonal-covariance Gaussian engine shipped
//! with the crate.

pub mod bank;
pub mod corpus;
pub mod folds;
pub mod hmm;
pub mod logging;
pub mod persist;
pub mod recognize;
pub mod select;
pub mod trainer;

// Scripted engines for unit and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bank::{build_bank, build_configured_bank, BankBuild, ModelBank};
pub use corpus::{Corpus, CorpusError, Frame, Sequence, TestItem, TestSet, Xlengths};
pub use hmm::{GaussianHmm, GaussianHmmEngine, HmmEngine, HmmModel, ScoreError, TrainError};
pub use persist::{load_bank, save_bank, BankSnapshot, PersistError};
pub use recognize::{recognize, Recognition, RecognizeError, ScoreTable};
pub use select::{CandidateOutcome, CandidateRecord, ModelSelector, SelectError, SelectedModel};
pub use trainer::ModelTrainer;

pub use hs_config::{SelectionConfig, Strategy};
