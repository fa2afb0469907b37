// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ranges and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::KeepsakeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KeepsakeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.models.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "models.base_url must not be empty".to_string(),
        });
    }

    if config.models.embedding_dim == 0 {
        errors.push(ConfigError::Validation {
            message: "models.embedding_dim must be positive".to_string(),
        });
    }

    let floor = config.memory.similarity_floor;
    if !(0.0..=1.0).contains(&floor) {
        errors.push(ConfigError::Validation {
            message: format!("memory.similarity_floor must be within [0.0, 1.0], got {floor}"),
        });
    }

    let relative = config.memory.relative_threshold;
    if !(0.0..=1.0).contains(&relative) {
        errors.push(ConfigError::Validation {
            message: format!("memory.relative_threshold must be within [0.0, 1.0], got {relative}"),
        });
    }

    if config.memory.top_k == 0 {
        errors.push(ConfigError::Validation {
            message: "memory.top_k must be at least 1".to_string(),
        });
    }

    if config.reminiscence.session_size == 0 {
        errors.push(ConfigError::Validation {
            message: "reminiscence.session_size must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
