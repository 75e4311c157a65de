// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: unit-interval scores, positive capacities, non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.memory.max_fragments == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.max_fragments must be at least 1".to_string(),
        });
    }

    if config.memory.decay_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.decay_days must be at least 1, got {}",
                config.memory.decay_days
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.importance_floor) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.importance_floor must be within [0, 1], got {}",
                config.memory.importance_floor
            ),
        });
    }

    if !(0.0..=1.0).contains(&config.memory.relevance_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.relevance_threshold must be within [0, 1], got {}",
                config.memory.relevance_threshold
            ),
        });
    }

    if config.memory.retrieval_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.retrieval_limit must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MnemoConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&MnemoConfig::default()).is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = MnemoConfig::default();
        config.memory.relevance_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("relevance_threshold"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = MnemoConfig::default();
        config.memory.max_fragments = 0;
        config.memory.importance_floor = -0.2;
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "validation must not fail fast");
    }
}
