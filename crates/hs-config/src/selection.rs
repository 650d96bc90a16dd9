//! Selection configuration types.
//!
//! Every field has a default so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// The closed set of model-selection criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fixed state count, no search.
    Constant,
    /// Bayesian Information Criterion (lower is better).
    #[default]
    Bic,
    /// Discriminative Information Criterion (higher is better).
    Dic,
    /// Mean held-out log-likelihood over k folds (higher is better).
    Cv,
}

impl Strategy {
    /// All strategies in declaration order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Constant,
        Strategy::Bic,
        Strategy::Dic,
        Strategy::Cv,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Constant => "constant",
            Strategy::Bic => "bic",
            Strategy::Dic => "dic",
            Strategy::Cv => "cv",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" | "const" => Ok(Strategy::Constant),
            "bic" => Ok(Strategy::Bic),
            "dic" => Ok(Strategy::Dic),
            "cv" | "cross-validation" | "cross_validation" => Ok(Strategy::Cv),
            _ => Err(format!("unknown selection strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Knobs forwarded to the HMM engine on every fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Maximum Baum-Welch iterations.
    pub n_iter: usize,
    /// Stop once the log-likelihood gain of one iteration falls below this.
    pub tol: f64,
    /// Floor added to every emission variance.
    pub min_covar: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_iter: 1000,
            tol: 1e-2,
            min_covar: 1e-3,
        }
    }
}

/// Cross-validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    /// Fold count used when a word has at least this many sequences.
    pub max_folds: usize,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self { max_folds: 3 }
    }
}

/// Complete selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub schema_version: String,

    /// Strategy used when building a model bank.
    pub strategy: Strategy,

    /// State count for the constant strategy.
    pub n_constant: usize,

    /// Inclusive lower bound of the searched state range.
    pub min_states: usize,

    /// Inclusive upper bound of the searched state range.
    pub max_states: usize,

    /// Seed passed to every training call.
    pub random_state: u64,

    /// Promote per-candidate training logs from debug to info.
    pub verbose: bool,

    pub trainer: TrainerConfig,

    pub cross_validation: CvConfig,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            strategy: Strategy::default(),
            n_constant: 3,
            min_states: 2,
            max_states: 10,
            random_state: 14,
            verbose: false,
            trainer: TrainerConfig::default(),
            cross_validation: CvConfig::default(),
        }
    }
}

impl SelectionConfig {
    /// Parse a config file, choosing TOML or JSON by extension
    /// (anything other than `.toml` is read as JSON).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Inclusive range of state counts searched by the adaptive strategies.
    pub fn state_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_states..=self.max_states
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_state_range(mut self, min_states: usize, max_states: usize) -> Self {
        self.min_states = min_states;
        self.max_states = max_states;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_n_constant(mut self, n_constant: usize) -> Self {
        self.n_constant = n_constant;
        self
    }
}
