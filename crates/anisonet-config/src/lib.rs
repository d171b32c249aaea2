// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Anisonet Configuration System
//!
//! Type-safe configuration for network builds:
//! - TOML file parsing (`[system]`, `[network]` or `[preset]`)
//! - Environment variable overrides
//! - CLI argument overrides
//! - Ready-made network presets
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anisonet_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//! let network = config.network_spec().expect("No network");
//! println!("{} pathways", network.pathways.len());
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod presets;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use presets::{preset, round_to_even, PRESET_NAMES};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

use anisonet_connectivity::ConnectivityError;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown preset: {0} (known: {})", PRESET_NAMES.join(", "))]
    UnknownPreset(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Network(#[from] ConnectivityError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
