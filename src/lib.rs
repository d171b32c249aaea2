// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # anisonet - anisotropic connectivity for spiking networks
//!
//! Builds spatially structured connectivity matrices for populations of
//! neurons on toroidal grids, optionally steered by smooth angular
//! landscapes, together with per-synapse parameters derived from the
//! resulting geometry.
//!
//! ## Feature Flags
//! - **`parallel`** (default): build independent pathways on the rayon pool
//! - **`file-logging`**: write logs to timestamped files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use anisonet::prelude::*;
//!
//! let spec = PathwaySpec::recurrent("II", 20, 50)
//!     .with_profile(
//!         RadialProfile::gaussian(2.0)
//!             .with_gap(1.0)
//!             .with_gap_policy(GapPolicy::Resample),
//!     )
//!     .with_anisotropy(AnisotropyConfig::connectivity(AngularBias::Fixed(0.0)));
//! let pathway = build_pathway(&spec, &mut seeded_rng(Some(18)))?;
//! println!("{} synapses", pathway.matrix.total_weight());
//! # Ok::<(), ConnectivityError>(())
//! ```
//!
//! Whole networks come from a config file or a preset:
//!
//! ```rust,no_run
//! let config = anisonet::config::load_config(None, None)?;
//! let network = anisonet::build_from_config(&config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use anisonet_config as config;
pub use anisonet_connectivity as connectivity;
pub use anisonet_observability as observability;

use anisonet_config::{validate_config, AnisonetConfig};
use anisonet_connectivity::{build_network, entropy_seed, Network};
use anyhow::Context;
use tracing::info;

/// Validate `config`, resolve its network and build it.
///
/// Without `system.seed` a fresh seed is drawn; it is recorded in
/// [`Network::seed`] so the run can be reproduced.
pub fn build_from_config(config: &AnisonetConfig) -> anyhow::Result<Network> {
    validate_config(config)?;
    let spec = config.network_spec()?;
    let seed = config.system.seed.unwrap_or_else(entropy_seed);
    info!(target: "anisonet-config", "Using master seed {}", seed);
    build_network(&spec, seed, config.system.parallel)
        .with_context(|| format!("Network build failed (seed {})", seed))
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use anisonet_config::{load_config, preset, AnisonetConfig};
    pub use anisonet_connectivity::{
        build_network, build_pathway, estimate_order_parameter, generate, seeded_rng,
        AngularBias, AnisotropyConfig, ConnectivityError, ConnectivityMatrix, GapPolicy,
        Landscape, LandscapeMethod, NetworkSpec, PathwaySpec, RadialBias, RadialProfile,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use anisonet_config::PresetConfig;

    #[test]
    fn test_build_from_preset_config() {
        let config = AnisonetConfig {
            preset: Some(PresetConfig {
                name: "homiso_net".to_string(),
                scalar: 10.0,
            }),
            system: anisonet_config::SystemConfig {
                seed: Some(4),
                ..Default::default()
            },
            ..Default::default()
        };
        let network = build_from_config(&config).unwrap();
        assert_eq!(network.seed, 4);
        assert_eq!(network.pathways["II"].matrix.shape(), (100, 100));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = build_from_config(&AnisonetConfig::default()).unwrap_err();
        assert!(err.to_string().contains("validation failed"), "{}", err);
    }
}
