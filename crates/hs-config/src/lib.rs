//! Configuration loading and validation for HMM topology selection.
//!
//! This crate provides:
//! - Typed Rust structs for the selection config (state range, seed, trainer
//!   knobs, cross-validation folds)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod resolve;
pub mod selection;
pub mod validate;

pub use resolve::{resolve_config, ConfigSource};
pub use selection::{CvConfig, SelectionConfig, Strategy, TrainerConfig};
pub use validate::{validate_selection, ValidationError, ValidationResult};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Semantic validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// A loaded, validated configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: SelectionConfig,
    /// File the config was read from (None for built-in defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Load the selection config using the standard resolution order and
/// validate it.
pub fn load_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let (path, source) = resolve_config(cli_path);
    let config = match &path {
        Some(path) => SelectionConfig::from_file(path)?,
        None => SelectionConfig::default(),
    };
    validate_selection(&config)?;
    Ok(ResolvedConfig {
        config,
        path,
        source,
    })
}
