// SPDX-FileCopyrightText: 2026 Querydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects every failure instead of stopping at the first.

use thiserror::Error;

use crate::model::QuerydeskConfig;

/// A single configuration validation failure.
#[derive(Debug, Error)]
#[error("validation error: {message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected errors
/// (does not fail fast).
pub fn validate_config(config: &QuerydeskConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ValidationError::new(
            "storage.database_path must not be empty",
        ));
    }

    let base_url = config.classifier.base_url.trim();
    if base_url.is_empty() {
        errors.push(ValidationError::new(
            "classifier.base_url must not be empty",
        ));
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ValidationError::new(format!(
            "classifier.base_url `{base_url}` must start with http:// or https://"
        )));
    }

    if config.classifier.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "classifier.timeout_secs must be at least 1",
        ));
    }

    if config.ingest.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "ingest.poll_interval_secs must be at least 1",
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.engine.log_level.as_str()) {
        errors.push(ValidationError::new(format!(
            "engine.log_level `{}` is not one of {valid_levels:?}",
            config.engine.log_level
        )));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
