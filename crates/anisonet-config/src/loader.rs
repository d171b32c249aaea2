// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{AnisonetConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "anisonet.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `ANISONET_CONFIG_PATH` environment variable
/// 2. Current working directory: `./anisonet.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("ANISONET_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by ANISONET_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(
            cwd.ancestors()
                .skip(1)
                .take(5)
                .map(|dir| dir.join(CONFIG_FILE_NAME)),
        );
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet ANISONET_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<AnisonetConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    debug!(target: "anisonet-config", "Loading configuration from {}", config_file.display());

    let content = fs::read_to_string(&config_file)?;
    let mut config: AnisonetConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `ANISONET_SEED` -> `system.seed`
/// - `ANISONET_LOG_LEVEL` -> `system.log_level`
/// - `ANISONET_PARALLEL` -> `system.parallel`
pub fn apply_environment_overrides(config: &mut AnisonetConfig) {
    if let Ok(value) = env::var("ANISONET_SEED") {
        match value.parse::<u64>() {
            Ok(seed) => config.system.seed = Some(seed),
            Err(_) => warn!(target: "anisonet-config", "Ignoring non-numeric ANISONET_SEED={}", value),
        }
    }
    if let Ok(value) = env::var("ANISONET_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("ANISONET_PARALLEL") {
        config.system.parallel = parse_bool(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"seed": "42", "parallel": "false"}`)
pub fn apply_cli_overrides(config: &mut AnisonetConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("seed") {
        match value.parse::<u64>() {
            Ok(seed) => config.system.seed = Some(seed),
            Err(_) => warn!(target: "anisonet-config", "Ignoring non-numeric --seed {}", value),
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("parallel") {
        config.system.parallel = parse_bool(value);
    }
}
