//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::selection::SelectionConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    fn invalid(field: &str, message: String) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message,
        }
    }
}

/// Validate a selection configuration semantically.
pub fn validate_selection(config: &SelectionConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.min_states == 0 {
        return Err(ValidationError::invalid(
            "min_states",
            "Must be at least 1".to_string(),
        ));
    }

    if config.min_states > config.max_states {
        return Err(ValidationError::invalid(
            "max_states",
            format!(
                "Must be >= min_states ({}), got {}",
                config.min_states, config.max_states
            ),
        ));
    }

    if !config.state_range().contains(&config.n_constant) {
        return Err(ValidationError::invalid(
            "n_constant",
            format!(
                "Must lie in [{}, {}], got {}",
                config.min_states, config.max_states, config.n_constant
            ),
        ));
    }

    if config.trainer.n_iter == 0 {
        return Err(ValidationError::invalid(
            "trainer.n_iter",
            "Must be at least 1".to_string(),
        ));
    }

    if !config.trainer.tol.is_finite() || config.trainer.tol < 0.0 {
        return Err(ValidationError::invalid(
            "trainer.tol",
            format!("Must be finite and non-negative, got {}", config.trainer.tol),
        ));
    }

    if !config.trainer.min_covar.is_finite() || config.trainer.min_covar <= 0.0 {
        return Err(ValidationError::invalid(
            "trainer.min_covar",
            format!(
                "Must be finite and positive, got {}",
                config.trainer.min_covar
            ),
        ));
    }

    if config.cross_validation.max_folds < 2 {
        return Err(ValidationError::invalid(
            "cross_validation.max_folds",
            format!("Must be at least 2, got {}", config.cross_validation.max_folds),
        ));
    }

    Ok(())
}
