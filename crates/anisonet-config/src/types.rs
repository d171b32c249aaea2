// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines the structs that map to sections in `anisonet.toml`.

use crate::presets::preset;
use crate::{ConfigError, ConfigResult};
use anisonet_connectivity::NetworkSpec;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnisonetConfig {
    pub system: SystemConfig,
    /// Explicit network definition
    pub network: NetworkSpec,
    /// Ready-made network used instead of `[network]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<PresetConfig>,
}

impl AnisonetConfig {
    /// The network to build: the preset if one is named, else `[network]`.
    pub fn network_spec(&self) -> ConfigResult<NetworkSpec> {
        match &self.preset {
            Some(p) => preset(&p.name, p.scalar),
            None if self.network.pathways.is_empty() => Err(ConfigError::MissingRequired(
                "either [network] pathways or a [preset]".to_string(),
            )),
            None => Ok(self.network.clone()),
        }
    }
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Master seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
    pub log_level: String,
    /// Build independent pathways on the rayon pool
    pub parallel: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
            parallel: true,
        }
    }
}

/// Named preset and its shrink factor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PresetConfig {
    pub name: String,
    #[serde(default = "default_scalar")]
    pub scalar: f64,
}

fn default_scalar() -> f64 {
    3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnisonetConfig::default();
        assert_eq!(config.system.log_level, "info");
        assert!(config.system.parallel);
        assert!(config.system.seed.is_none());
        assert!(matches!(config.network_spec(), Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_preset_section_parses() {
        let config: AnisonetConfig = toml::from_str(
            r#"
            [system]
            seed = 7

            [preset]
            name = "I_net"
            "#,
        )
        .unwrap();
        assert_eq!(config.system.seed, Some(7));
        let preset = config.preset.as_ref().unwrap();
        assert_eq!(preset.scalar, 3.0);
        assert_eq!(config.network_spec().unwrap().pathways.len(), 1);
    }

    #[test]
    fn test_network_section_parses() {
        let config: AnisonetConfig = toml::from_str(
            r#"
            [network.populations.E]
            grid_size = 20

            [network.pathways.EE]
            ncons = 10
            profile = { type = "gaussian", std = 2.0, gap = 1.0, gap_policy = "resample" }

            [network.pathways.EE.anisotropy]
            connectivity = "landscape"
            synaptic = "cos"
            params = { phi = { type = "perlin", scale = 4 } }
            vars = { U = [0.05, 0.3] }
            "#,
        )
        .unwrap();
        let network = config.network_spec().unwrap();
        let spec = network.pathway_spec("EE").unwrap();
        assert!(spec.recurrent);
        assert_eq!(spec.ncons, 10);
        let anisotropy = spec.anisotropy.unwrap();
        assert!(anisotropy.biases_connectivity() && anisotropy.biases_synapses());
        assert_eq!(anisotropy.vars["U"], (0.05, 0.3));
    }
}
