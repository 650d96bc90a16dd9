//! Versioned JSON snapshots of a model bank.
//!
//! A snapshot records the strategy and seed that produced the bank so a
//! loaded bank can be traced back to its configuration. Writes go to a
//! temporary file first and are renamed into place.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hs_config::Strategy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bank::ModelBank;
use crate::hmm::GaussianHmm;
use crate::logging::{event_names, Stage};

/// Schema version for bank snapshots.
pub const BANK_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot schema {actual} is not supported (expected {expected})")]
    SchemaMismatch { expected: String, actual: String },

    #[error("model for {word:?} is malformed")]
    InvalidModel { word: String },
}

/// A model bank plus the settings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSnapshot<M> {
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub strategy: Strategy,
    pub random_state: u64,
    pub models: ModelBank<M>,
}

impl<M> BankSnapshot<M> {
    pub fn new(models: ModelBank<M>, strategy: Strategy, random_state: u64) -> Self {
        Self {
            schema_version: BANK_SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            strategy,
            random_state,
            models,
        }
    }
}

/// Write `snapshot` to `path` as pretty JSON, creating parent directories.
pub fn save_bank<M: Serialize>(path: &Path, snapshot: &BankSnapshot<M>) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_vec_pretty(snapshot).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.flush().map_err(io_err)?;
    }
    fs::rename(&tmp_path, path).map_err(io_err)?;

    tracing::info!(
        event = event_names::SNAPSHOT_SAVED,
        stage = %Stage::Persist,
        path = %path.display(),
        models = snapshot.models.len(),
        "model bank saved"
    );
    Ok(())
}

/// Read a Gaussian HMM bank, rejecting unknown schema versions and
/// malformed models.
pub fn load_bank(path: &Path) -> Result<BankSnapshot<GaussianHmm>, PersistError> {
    let content = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Check the version before decoding models so an incompatible layout
    // reports the version, not a field error.
    #[derive(Deserialize)]
    struct Header {
        schema_version: String,
    }
    let header: Header = serde_json::from_str(&content).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if header.schema_version != BANK_SCHEMA_VERSION {
        return Err(PersistError::SchemaMismatch {
            expected: BANK_SCHEMA_VERSION.to_string(),
            actual: header.schema_version,
        });
    }

    let snapshot: BankSnapshot<GaussianHmm> =
        serde_json::from_str(&content).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some((word, _)) = snapshot.models.iter().find(|(_, m)| !m.is_well_formed()) {
        return Err(PersistError::InvalidModel {
            word: word.to_string(),
        });
    }

    tracing::info!(
        event = event_names::SNAPSHOT_LOADED,
        stage = %Stage::Persist,
        path = %path.display(),
        models = snapshot.models.len(),
        "model bank loaded"
    );
    Ok(snapshot)
}
