// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ready-made networks.
//!
//! Every preset is defined at full size and shrunk by `scalar`: grid sizes and
//! connection counts are divided (and rounded to even numbers), radial
//! profiles are narrowed by the same factor. Only connectivity settings are
//! carried; neuron and synapse dynamics belong to the simulator.

use crate::{ConfigError, ConfigResult};
use anisonet_connectivity::{
    AngularBias, AnisotropyConfig, GapPolicy, LandscapeMethod, NetworkSpec, PathwayConfig,
    PopulationSpec, RadialProfile,
};
use tracing::debug;

/// Names accepted by [`preset`]
pub const PRESET_NAMES: &[&str] = &[
    "homiso_net",
    "iso_net",
    "homo_net",
    "I_net",
    "E_net",
    "EI_net",
    "demo",
    "dummy",
    "STSP_TM_I_net",
];

/// `value / scaler` rounded half-to-even, bumped to the next even number if odd.
pub fn round_to_even(value: f64, scaler: f64) -> usize {
    let rounded = (value / scaler).round_ties_even().max(0.0) as usize;
    if rounded % 2 == 1 {
        rounded + 1
    } else {
        rounded
    }
}

/// Largest divisor of `grid_size` not above `scale` (at least 1).
fn perlin_scale(grid_size: usize, scale: usize) -> usize {
    (1..=scale.min(grid_size).max(1))
        .rev()
        .find(|s| grid_size % s == 0)
        .unwrap_or(1)
}

/// Builder for one preset, carrying the shrink factor.
struct Scaled {
    scalar: f64,
    spec: NetworkSpec,
}

impl Scaled {
    fn new(scalar: f64) -> Self {
        Self {
            scalar,
            spec: NetworkSpec::default(),
        }
    }

    fn population(mut self, name: &str, full_grid: f64) -> Self {
        let grid_size = round_to_even(full_grid, self.scalar);
        self.spec
            .populations
            .insert(name.to_string(), PopulationSpec { grid_size });
        self
    }

    fn grid_of(&self, pathway: &str) -> usize {
        pathway
            .get(..1)
            .and_then(|p| self.spec.populations.get(p))
            .map_or(1, |p| p.grid_size)
    }

    fn ncons(&self, full: f64) -> usize {
        round_to_even(full, self.scalar * self.scalar)
    }

    fn gap(&self, full: f64) -> f64 {
        f64::max(2.0, full / self.scalar)
    }

    fn gamma(&self, gap: f64) -> RadialProfile {
        RadialProfile::gamma(4.0, 3.0 / self.scalar)
            .with_gap(self.gap(gap))
            .with_gap_policy(GapPolicy::Resample)
    }

    fn gaussian(&self, std: f64) -> RadialProfile {
        RadialProfile::gaussian(std / self.scalar)
            .with_gap(self.gap(6.0))
            .with_gap_policy(GapPolicy::Resample)
    }

    fn perlin(&self, pathway: &str, scale: usize) -> AngularBias {
        AngularBias::Generated(LandscapeMethod::Perlin {
            scale: perlin_scale(self.grid_of(pathway), scale),
            seamless: true,
        })
    }

    fn pathway(mut self, name: &str, config: PathwayConfig) -> Self {
        self.spec.pathways.insert(name.to_string(), config);
        self
    }
}

/// Build a named preset network, shrunk by `scalar`.
pub fn preset(name: &str, scalar: f64) -> ConfigResult<NetworkSpec> {
    if !(scalar.is_finite() && scalar > 0.0) {
        return Err(ConfigError::InvalidValue(format!(
            "preset scalar must be positive, got {}",
            scalar
        )));
    }
    let s = Scaled::new(scalar);
    let network = match name {
        "homiso_net" => {
            let s = s.population("I", 100.0);
            let ii = PathwayConfig::new(s.ncons(1000.0));
            s.pathway("II", ii)
        }
        "iso_net" => {
            let s = s.population("I", 100.0);
            let ii = PathwayConfig::new(s.ncons(1000.0)).with_profile(s.gamma(5.0));
            s.pathway("II", ii)
        }
        "homo_net" => {
            let s = s.population("I", 100.0);
            let ii = PathwayConfig::new(s.ncons(1000.0))
                .with_anisotropy(AnisotropyConfig::connectivity(s.perlin("II", 3)));
            s.pathway("II", ii)
        }
        "I_net" | "demo" => {
            let scale = if name == "demo" { 2 } else { 3 };
            let s = s.population("I", 100.0);
            let ii = PathwayConfig::new(s.ncons(1000.0))
                .with_profile(s.gamma(6.0))
                .with_anisotropy(AnisotropyConfig::connectivity(s.perlin("II", scale)));
            s.pathway("II", ii)
        }
        "E_net" => {
            let s = s.population("E", 100.0);
            let ee = PathwayConfig::new(s.ncons(1000.0))
                .with_profile(s.gamma(6.0))
                .with_anisotropy(AnisotropyConfig::connectivity(s.perlin("EE", 4)));
            s.pathway("EE", ee)
        }
        "EI_net" => {
            let s = s.population("I", 60.0).population("E", 120.0);
            let random = || AnisotropyConfig::connectivity(AngularBias::Generated(LandscapeMethod::Random));
            let ee = PathwayConfig::new(s.ncons(720.0))
                .with_profile(s.gaussian(9.0))
                .with_anisotropy(AnisotropyConfig::connectivity(s.perlin("EE", 2)));
            let ei = PathwayConfig::new(s.ncons(180.0))
                .with_profile(s.gaussian(4.5))
                .with_anisotropy(random());
            let ie = PathwayConfig::new(s.ncons(720.0))
                .with_profile(s.gaussian(12.0))
                .with_anisotropy(random());
            let ii = PathwayConfig::new(s.ncons(180.0))
                .with_profile(s.gaussian(6.0))
                .with_anisotropy(random());
            s.pathway("EE", ee)
                .pathway("EI", ei)
                .pathway("IE", ie)
                .pathway("II", ii)
        }
        "dummy" => {
            let s = s.population("I", 100.0);
            let ii = PathwayConfig::new(s.ncons(1000.0))
                .with_profile(s.gamma(6.0))
                .with_anisotropy(
                    AnisotropyConfig::synaptic(s.perlin("II", 3)).with_synaptic_var("U", 0.1, 0.4),
                );
            s.pathway("II", ii)
        }
        "STSP_TM_I_net" => {
            let s = s.population("I", 100.0);
            let anisotropy =
                AnisotropyConfig::connectivity(s.perlin("II", 2)).with_synaptic_var("U", 0.05, 0.3);
            let ii = PathwayConfig::new(s.ncons(1000.0))
                .with_profile(s.gamma(5.0))
                .with_anisotropy(anisotropy);
            s.pathway("II", ii)
        }
        other => return Err(ConfigError::UnknownPreset(other.to_string())),
    };

    debug!(target: "anisonet-config",
        "Preset {} (scalar {}): {} populations, {} pathways",
        name, scalar, network.spec.populations.len(), network.spec.pathways.len());
    Ok(network.spec)
}
