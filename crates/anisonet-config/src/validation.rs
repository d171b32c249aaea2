// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks the whole configuration and reports every problem at once, before
//! any network is sampled.

use crate::{AnisonetConfig, ConfigError, ConfigResult, PRESET_NAMES};

/// Log levels accepted in `system.log_level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
    Conflict { reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::Conflict { reason } => write!(f, "Conflicting configuration: {}", reason),
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - A known log level
/// - Exactly one network source (`[network]` or `[preset]`)
/// - Preset name and shrink factor
/// - Populations with positive grids
/// - Pathways whose endpoints exist and whose parameters are complete
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &AnisonetConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every problem in `config`, in section order.
pub fn collect_errors(config: &AnisonetConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_system(config, &mut errors);
    validate_network_source(config, &mut errors);
    validate_populations(config, &mut errors);
    validate_pathways(config, &mut errors);
    errors
}

fn validate_system(config: &AnisonetConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&config.system.log_level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.system.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
}

fn validate_network_source(config: &AnisonetConfig, errors: &mut Vec<ConfigValidationError>) {
    let has_network = !config.network.pathways.is_empty() || !config.network.populations.is_empty();
    match &config.preset {
        Some(_) if has_network => errors.push(ConfigValidationError::Conflict {
            reason: "both [preset] and [network] are set".to_string(),
        }),
        Some(preset) => {
            if !PRESET_NAMES.contains(&preset.name.as_str()) {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "preset.name".to_string(),
                    reason: format!("unknown preset '{}'", preset.name),
                });
            }
            if !(preset.scalar.is_finite() && preset.scalar > 0.0) {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "preset.scalar".to_string(),
                    reason: format!("must be positive, got {}", preset.scalar),
                });
            }
        }
        None if config.network.pathways.is_empty() => {
            errors.push(ConfigValidationError::MissingRequired {
                field: "network.pathways (or a [preset])".to_string(),
            })
        }
        None => {}
    }
}

fn validate_populations(config: &AnisonetConfig, errors: &mut Vec<ConfigValidationError>) {
    for (name, population) in &config.network.populations {
        if population.grid_size == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("network.populations.{}.grid_size", name),
                reason: "must be positive".to_string(),
            });
        }
    }
}

fn validate_pathways(config: &AnisonetConfig, errors: &mut Vec<ConfigValidationError>) {
    for name in config.network.pathways.keys() {
        let result = config
            .network
            .pathway_spec(name)
            .and_then(|spec| spec.validate());
        if let Err(err) = result {
            errors.push(ConfigValidationError::InvalidValue {
                field: format!("network.pathways.{}", name),
                reason: err.to_string(),
            });
        }
    }
}
