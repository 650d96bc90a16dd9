//! Event names and stages attached to structured log records.

use serde::{Deserialize, Serialize};

/// Pipeline stage a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fitting one candidate model.
    Train,
    /// Searching the state range for one word.
    Select,
    /// Building the model bank over the vocabulary.
    Bank,
    /// Scoring test items.
    Recognize,
    /// Saving or loading a bank snapshot.
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Train => "train",
            Stage::Select => "select",
            Stage::Bank => "bank",
            Stage::Recognize => "recognize",
            Stage::Persist => "persist",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of the `event` field.
pub mod event_names {
    pub const CANDIDATE_TRAINED: &str = "candidate.trained";
    pub const CANDIDATE_TRAIN_FAILED: &str = "candidate.train_failed";
    pub const CANDIDATE_SCORED: &str = "candidate.scored";
    pub const CANDIDATE_SKIPPED: &str = "candidate.skipped";

    pub const SELECTION_COMPLETED: &str = "selection.completed";
    pub const SELECTION_FAILED: &str = "selection.failed";

    pub const BANK_COMPLETED: &str = "bank.completed";

    pub const RECOGNIZE_COMPLETED: &str = "recognize.completed";

    pub const SNAPSHOT_SAVED: &str = "snapshot.saved";
    pub const SNAPSHOT_LOADED: &str = "snapshot.loaded";
}
